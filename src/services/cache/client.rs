//! Cache client interface used by the token cache.
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache-layer errors (transport/command/timeout).
///
/// Kept independent from `AppError`: the token cache decides how a backend
/// failure affects the request (a failed read degrades to a miss).
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    BackendConnection(String),
    #[error("cache command error: {0}")]
    BackendCommand(String),
    #[error("cache command timed out after {0:?}")]
    Timeout(Duration),
}

/// A minimal string-keyed cache interface: get / set-with-TTL / delete.
///
/// Shared as `Arc<dyn CacheClient>` by every in-flight request, so
/// implementations must be usable concurrently without external locking.
#[async_trait]
pub trait CacheClient: Send + Sync + 'static {
    // Returns the cache backend name (for logging).
    fn backend_name(&self) -> &'static str;

    // Get UTF-8 string value.
    async fn get_string(&self, key: &str) -> CacheResult<Option<String>>;

    // Set value with TTL, overwriting any previous value.
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    // Delete a key. Returns number of deleted keys.
    async fn del(&self, key: &str) -> CacheResult<u64>;
}
