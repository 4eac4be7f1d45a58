/*
 * Responsibility
 * - token → IntrospectionRecord の cache-aside 層 (key は生の bearer token)
 * - TTL = exp - now。exp が無い / 既に切れている結果は保存しない
 * - backend 障害は warn ログ: 読み込み失敗は miss 扱い、書き込み/削除失敗はリクエストを落とさない
 */
use std::sync::Arc;
use std::time::Duration;

use crate::services::cache::CacheClient;
use crate::services::token::{fingerprint, record::IntrospectionRecord};

/// Remaining lifetime of a token, or `None` when it must not be cached.
pub fn ttl_for(exp: Option<i64>, now: i64) -> Option<Duration> {
    let remaining = exp?.checked_sub(now)?;
    u64::try_from(remaining)
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

#[derive(Clone)]
pub struct TokenCache {
    client: Arc<dyn CacheClient>,
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("backend", &self.client.backend_name())
            .finish()
    }
}

impl TokenCache {
    pub fn new(client: Arc<dyn CacheClient>) -> Self {
        Self { client }
    }

    /// Cached record for `token`. The payload is returned as stored; staleness
    /// is left to the Active gate.
    pub async fn lookup(&self, token: &str) -> Option<IntrospectionRecord> {
        match self.client.get_string(token).await {
            Ok(Some(raw)) => {
                tracing::debug!(token = %fingerprint(token), "token cache hit");
                Some(IntrospectionRecord::from_cached(&raw))
            }
            Ok(None) => {
                tracing::debug!(token = %fingerprint(token), "token cache miss");
                None
            }
            Err(err) => {
                tracing::warn!(
                    backend = self.client.backend_name(),
                    error = %err,
                    "token cache read failed, treating as miss"
                );
                None
            }
        }
    }

    /// Persist a fresh introspection result.
    ///
    /// On success the stored payload carries `cached_time = now` and `record`
    /// is updated to match. Returns whether anything was written.
    pub async fn store(&self, token: &str, record: &mut IntrospectionRecord, now: i64) -> bool {
        let Some(ttl) = ttl_for(record.exp, now) else {
            tracing::debug!(
                token = %fingerprint(token),
                exp = ?record.exp,
                "introspection result has no remaining lifetime, not caching"
            );
            return false;
        };

        let stamped = IntrospectionRecord {
            cached_time: Some(now),
            ..record.clone()
        };

        let payload = match serde_json::to_string(&stamped) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize introspection result");
                return false;
            }
        };

        match self.client.set_with_ttl(token, &payload, ttl).await {
            Ok(()) => {
                *record = stamped;
                true
            }
            Err(err) => {
                tracing::warn!(
                    backend = self.client.backend_name(),
                    error = %err,
                    "token cache write failed"
                );
                false
            }
        }
    }

    /// Drop the cached record so the next lookup misses.
    pub async fn evict(&self, token: &str) {
        if let Err(err) = self.client.del(token).await {
            tracing::warn!(
                backend = self.client.backend_name(),
                error = %err,
                "token cache delete failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::services::cache::{CacheError, CacheResult};

    const NOW: i64 = 1_700_000_000;

    #[derive(Default)]
    struct RecordingCache {
        entries: Mutex<HashMap<String, (String, Duration)>>,
        fail: bool,
    }

    #[async_trait]
    impl CacheClient for RecordingCache {
        fn backend_name(&self) -> &'static str {
            "recording"
        }

        async fn get_string(&self, key: &str) -> CacheResult<Option<String>> {
            if self.fail {
                return Err(CacheError::BackendCommand("down".into()));
            }
            Ok(self.entries.lock().unwrap().get(key).map(|(v, _)| v.clone()))
        }

        async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
            if self.fail {
                return Err(CacheError::BackendCommand("down".into()));
            }
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), ttl));
            Ok(())
        }

        async fn del(&self, key: &str) -> CacheResult<u64> {
            Ok(self.entries.lock().unwrap().remove(key).map_or(0, |_| 1))
        }
    }

    fn record(exp: Option<i64>) -> IntrospectionRecord {
        IntrospectionRecord {
            active: true,
            sub: Some("user-1".into()),
            aud: json!("api-x"),
            iat: Some(NOW - 10),
            exp,
            ..Default::default()
        }
    }

    #[test]
    fn ttl_is_remaining_lifetime() {
        assert_eq!(ttl_for(Some(NOW + 600), NOW), Some(Duration::from_secs(600)));
        assert_eq!(ttl_for(Some(NOW), NOW), None);
        assert_eq!(ttl_for(Some(NOW - 5), NOW), None);
        assert_eq!(ttl_for(None, NOW), None);
    }

    #[tokio::test]
    async fn store_uses_exp_minus_now_and_stamps_cached_time() {
        let backend = Arc::new(RecordingCache::default());
        let cache = TokenCache::new(backend.clone());

        let mut rec = record(Some(NOW + 600));
        assert!(cache.store("tok", &mut rec, NOW).await);
        assert_eq!(rec.cached_time, Some(NOW));

        let entries = backend.entries.lock().unwrap();
        let (payload, ttl) = entries.get("tok").unwrap();
        assert_eq!(*ttl, Duration::from_secs(600));

        let stored: serde_json::Value = serde_json::from_str(payload).unwrap();
        assert_eq!(stored["cached_time"], json!(NOW));
        assert_eq!(stored["sub"], json!("user-1"));
    }

    #[tokio::test]
    async fn result_without_exp_is_not_written() {
        let backend = Arc::new(RecordingCache::default());
        let cache = TokenCache::new(backend.clone());

        let mut rec = record(None);
        assert!(!cache.store("tok", &mut rec, NOW).await);
        assert_eq!(rec.cached_time, None);
        assert!(backend.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn expired_result_is_not_written() {
        let backend = Arc::new(RecordingCache::default());
        let cache = TokenCache::new(backend.clone());

        let mut rec = record(Some(NOW));
        assert!(!cache.store("tok", &mut rec, NOW).await);
        assert!(backend.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn lookup_returns_stored_record_and_evict_removes_it() {
        let backend = Arc::new(RecordingCache::default());
        let cache = TokenCache::new(backend.clone());

        let mut rec = record(Some(NOW + 60));
        cache.store("tok", &mut rec, NOW).await;

        assert_eq!(cache.lookup("tok").await, Some(rec));

        cache.evict("tok").await;
        assert_eq!(cache.lookup("tok").await, None);
    }

    #[tokio::test]
    async fn backend_failure_degrades_to_miss() {
        let backend = Arc::new(RecordingCache {
            fail: true,
            ..Default::default()
        });
        let cache = TokenCache::new(backend);

        assert_eq!(cache.lookup("tok").await, None);

        let mut rec = record(Some(NOW + 60));
        assert!(!cache.store("tok", &mut rec, NOW).await);
        assert_eq!(rec.cached_time, None);
    }

    #[tokio::test]
    async fn malformed_payload_is_returned_as_default_record() {
        let backend = Arc::new(RecordingCache::default());
        backend.entries.lock().unwrap().insert(
            "tok".to_string(),
            ("{not json".to_string(), Duration::from_secs(5)),
        );
        let cache = TokenCache::new(backend);

        assert_eq!(
            cache.lookup("tok").await,
            Some(IntrospectionRecord::default())
        );
    }
}
