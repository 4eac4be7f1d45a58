use async_trait::async_trait;
use std::{future::Future, time::Duration};

use crate::services::cache::client::{CacheClient, CacheError, CacheResult};

/// Valkey/Redis-backed cache client.
///
/// `ConnectionManager` multiplexes one connection and is cheap to clone, so
/// each command works on its own clone and concurrent requests never wait on
/// a client-side lock. Every command is bounded by `command_timeout`.
#[derive(Clone, Debug)]
pub struct ValkeyClient {
    manager: redis::aio::ConnectionManager,
    command_timeout: Duration,
}

impl ValkeyClient {
    // Create a Valkey client from a URL like `redis://:password@localhost:6379/0`
    pub async fn new(url: &str, command_timeout: Duration) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(url).map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        let manager = tokio::time::timeout(command_timeout, client.get_connection_manager())
            .await
            .map_err(|_| CacheError::Timeout(command_timeout))?
            .map_err(|e| CacheError::BackendConnection(e.to_string()))?;

        Ok(Self {
            manager,
            command_timeout,
        })
    }

    async fn bounded<T, F>(&self, fut: F) -> CacheResult<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        tokio::time::timeout(self.command_timeout, fut)
            .await
            .map_err(|_| CacheError::Timeout(self.command_timeout))?
            .map_err(|e| CacheError::BackendCommand(e.to_string()))
    }
}

#[async_trait]
impl CacheClient for ValkeyClient {
    fn backend_name(&self) -> &'static str {
        "valkey"
    }

    async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.manager.clone();

        self.bounded(async move {
            redis::cmd("GET")
                .arg(key)
                .query_async::<Option<String>>(&mut conn)
                .await
        })
        .await
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        // `SET key value EX <seconds>`; EX expects integer seconds, at least 1.
        let mut conn = self.manager.clone();
        let ttl_seconds: u64 = ttl.as_secs().max(1);

        self.bounded(async move {
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(ttl_seconds)
                .query_async::<()>(&mut conn)
                .await
        })
        .await
    }

    async fn del(&self, key: &str) -> CacheResult<u64> {
        let mut conn = self.manager.clone();

        // DEL returns number of keys removed (0 or 1 for a single key).
        self.bounded(async move { redis::cmd("DEL").arg(key).query_async::<u64>(&mut conn).await })
            .await
    }
}
