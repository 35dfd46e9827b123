//! Fail-open cache store.

use super::backend::CacheBackend;
use super::key::CacheKey;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Upper bound on a single backend round trip; an elapsed timeout counts as a failure.
    pub op_timeout: Duration,
    pub key_prefix: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            op_timeout: Duration::from_millis(250),
            key_prefix: Some("prediction".to_string()),
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
    pub fn with_op_timeout(mut self, timeout: Duration) -> Self {
        self.op_timeout = timeout;
        self
    }
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }
    pub fn without_key_prefix(mut self) -> Self {
        self.key_prefix = None;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub errors: u64,
}

impl CacheStats {
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct AtomicStats {
    hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    errors: AtomicU64,
}

impl AtomicStats {
    fn new() -> Self {
        Self {
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            deletes: AtomicU64::new(0),
            errors: AtomicU64::new(0),
        }
    }
    fn to_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Front for a [`CacheBackend`] that never fails its caller.
///
/// Backend errors and timeouts are logged, counted, and then treated as a miss
/// (`get`) or as done (`set`, `delete`). The store is shared across requests
/// behind an `Arc` and needs no external locking.
pub struct CacheStore {
    config: CacheConfig,
    backend: Arc<dyn CacheBackend>,
    stats: AtomicStats,
}

impl CacheStore {
    pub fn new(config: CacheConfig, backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            config,
            backend,
            stats: AtomicStats::new(),
        }
    }

    pub async fn get(&self, key: &CacheKey) -> Option<String> {
        if !self.config.enabled {
            return None;
        }
        let prefixed = self.prefix_key(key);
        match self.bounded("get", &prefixed, self.backend.get(&prefixed)).await {
            Some(Some(value)) => {
                self.stats.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            Some(None) => {
                self.stats.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            None => None,
        }
    }

    pub async fn set(&self, key: &CacheKey, value: &str, ttl: Option<Duration>) {
        if !self.config.enabled {
            return;
        }
        let prefixed = self.prefix_key(key);
        if self
            .bounded("set", &prefixed, self.backend.set(&prefixed, value, ttl))
            .await
            .is_some()
        {
            self.stats.sets.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Best-effort removal; returns whether the backend reported an entry removed.
    pub async fn delete(&self, key: &CacheKey) -> bool {
        if !self.config.enabled {
            return false;
        }
        let prefixed = self.prefix_key(key);
        let removed = self
            .bounded("delete", &prefixed, self.backend.delete(&prefixed))
            .await
            .unwrap_or(false);
        if removed {
            self.stats.deletes.fetch_add(1, Ordering::Relaxed);
        }
        removed
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Runs one backend call under the configured timeout. `None` means the call
    /// failed or timed out; the failure has already been logged and counted.
    async fn bounded<T>(
        &self,
        op: &'static str,
        key: &CacheKey,
        call: impl Future<Output = crate::Result<T>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.config.op_timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    backend = self.backend.name(),
                    op,
                    key = %key,
                    error = %e,
                    "cache operation failed; continuing without cache"
                );
                None
            }
            Err(_) => {
                self.stats.errors.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    backend = self.backend.name(),
                    op,
                    key = %key,
                    timeout_ms = self.config.op_timeout.as_millis() as u64,
                    "cache operation timed out; continuing without cache"
                );
                None
            }
        }
    }

    fn prefix_key(&self, key: &CacheKey) -> CacheKey {
        if let Some(ref p) = self.config.key_prefix {
            CacheKey::new(format!("{}:{}", p, key.hash))
        } else {
            key.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::{Error, ErrorContext, Result};
    use async_trait::async_trait;

    struct BrokenBackend;

    #[async_trait]
    impl CacheBackend for BrokenBackend {
        async fn get(&self, _: &CacheKey) -> Result<Option<String>> {
            Err(Error::cache_with_context("down", ErrorContext::new()))
        }
        async fn set(&self, _: &CacheKey, _: &str, _: Option<Duration>) -> Result<()> {
            Err(Error::cache_with_context("down", ErrorContext::new()))
        }
        async fn delete(&self, _: &CacheKey) -> Result<bool> {
            Err(Error::cache_with_context("down", ErrorContext::new()))
        }
        fn name(&self) -> &'static str {
            "broken"
        }
    }

    struct StalledBackend;

    #[async_trait]
    impl CacheBackend for StalledBackend {
        async fn get(&self, _: &CacheKey) -> Result<Option<String>> {
            futures::future::pending().await
        }
        async fn set(&self, _: &CacheKey, _: &str, _: Option<Duration>) -> Result<()> {
            futures::future::pending().await
        }
        async fn delete(&self, _: &CacheKey) -> Result<bool> {
            futures::future::pending().await
        }
        fn name(&self) -> &'static str {
            "stalled"
        }
    }

    #[tokio::test]
    async fn prefixes_keys_in_the_backend() {
        let backend = Arc::new(MemoryCache::new(8));
        let store = CacheStore::new(CacheConfig::new().with_key_prefix("p"), backend.clone());
        store.set(&CacheKey::new("abc"), "1.00", None).await;

        assert_eq!(
            backend.get(&CacheKey::new("p:abc")).await.unwrap().as_deref(),
            Some("1.00")
        );
        assert_eq!(store.get(&CacheKey::new("abc")).await.as_deref(), Some("1.00"));
    }

    #[tokio::test]
    async fn backend_errors_fail_open() {
        let store = CacheStore::new(CacheConfig::default(), Arc::new(BrokenBackend));
        let key = CacheKey::new("k");
        assert_eq!(store.get(&key).await, None);
        store.set(&key, "1.00", Some(Duration::from_secs(1))).await;
        assert!(!store.delete(&key).await);

        let stats = store.stats();
        assert_eq!(stats.errors, 3);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.sets, 0);
    }

    #[tokio::test]
    async fn stalled_backend_is_bounded_by_timeout() {
        let store = CacheStore::new(
            CacheConfig::new().with_op_timeout(Duration::from_millis(20)),
            Arc::new(StalledBackend),
        );
        let started = std::time::Instant::now();
        assert_eq!(store.get(&CacheKey::new("k")).await, None);
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(store.stats().errors, 1);
    }

    #[tokio::test]
    async fn disabled_store_skips_backend() {
        let backend = Arc::new(MemoryCache::new(8));
        let store = CacheStore::new(CacheConfig::new().with_enabled(false), backend.clone());
        store.set(&CacheKey::new("k"), "1.00", None).await;
        assert!(backend.is_empty());
        assert_eq!(store.stats(), CacheStats::default());
    }

    #[tokio::test]
    async fn counts_hits_and_misses() {
        let store = CacheStore::new(CacheConfig::default(), Arc::new(MemoryCache::new(8)));
        let key = CacheKey::new("k");
        store.get(&key).await;
        store.set(&key, "2.50", None).await;
        store.get(&key).await;
        assert!(store.delete(&key).await);

        let stats = store.stats();
        assert_eq!((stats.hits, stats.misses, stats.sets, stats.deletes), (1, 1, 1, 1));
        assert!((stats.hit_ratio() - 0.5).abs() < f64::EPSILON);
    }
}
