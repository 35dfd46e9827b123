//! Cache-aside prediction orchestrator.
//!
//! Per request:
//!
//! 1. derive the canonical key
//! 2. look it up; a parseable hit is returned without calling upstream
//! 3. on a miss, ask the [`PredictionService`]
//! 4. on success, write the fixed-point string back with a TTL and return,
//!    whatever the write outcome
//! 5. on failure, write nothing and return the error
//!
//! Identical requests arriving together are not coalesced: each concurrent miss
//! makes its own upstream call.

use crate::cache::{CacheKeyBuilder, CacheStore};
use crate::inference::PredictionService;
use crate::types::{PredictionRequest, Price};
use crate::PredictionError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn, Instrument};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Expiry for written-back predictions.
    pub ttl: Duration,
    /// Extra guard around the upstream call, on top of the client's own timeout.
    pub upstream_timeout: Option<Duration>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            upstream_timeout: None,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = Some(timeout);
        self
    }
}

pub struct PredictionOrchestrator {
    cache: Arc<CacheStore>,
    upstream: Arc<dyn PredictionService>,
    keys: CacheKeyBuilder,
    config: OrchestratorConfig,
}

impl PredictionOrchestrator {
    pub fn new(cache: Arc<CacheStore>, upstream: Arc<dyn PredictionService>) -> Self {
        Self {
            cache,
            upstream,
            keys: CacheKeyBuilder::new(),
            config: OrchestratorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_key_builder(mut self, keys: CacheKeyBuilder) -> Self {
        self.keys = keys;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn key_builder(&self) -> &CacheKeyBuilder {
        &self.keys
    }

    /// Answer `request` from the cache or, on a miss, from the inference service.
    pub async fn orchestrate(&self, request: &PredictionRequest) -> Result<Price, PredictionError> {
        let key = self.keys.build(request);
        let span = tracing::info_span!("predict", key = %key);

        async move {
            if let Some(cached) = self.cache.get(&key).await {
                match cached.parse::<Price>() {
                    Ok(price) => {
                        info!(prediction = %price, "cache hit");
                        return Ok(price);
                    }
                    Err(e) => {
                        warn!(value = %cached, error = %e, "unparseable cache entry; treating as miss");
                    }
                }
            }

            info!("cache miss; calling inference service");
            let price = self.call_upstream(request).await?;

            self.cache
                .set(&key, &price.to_string(), Some(self.config.ttl))
                .await;
            debug!(prediction = %price, ttl_secs = self.config.ttl.as_secs(), "prediction cached");
            Ok(price)
        }
        .instrument(span)
        .await
    }

    async fn call_upstream(&self, request: &PredictionRequest) -> Result<Price, PredictionError> {
        match self.config.upstream_timeout {
            None => self.upstream.predict(request).await,
            Some(limit) => tokio::time::timeout(limit, self.upstream.predict(request))
                .await
                .map_err(|_| {
                    PredictionError::unavailable(format!(
                        "no response within {}ms",
                        limit.as_millis()
                    ))
                })?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheConfig, MemoryCache};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct SlowService {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PredictionService for SlowService {
        async fn predict(&self, _: &PredictionRequest) -> Result<Price, PredictionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Price::from_hundredths(100))
        }
    }

    #[tokio::test]
    async fn upstream_timeout_surfaces_as_unavailable_and_caches_nothing() {
        let backend = Arc::new(MemoryCache::new(8));
        let cache = Arc::new(CacheStore::new(CacheConfig::default(), backend.clone()));
        let service = Arc::new(SlowService {
            calls: AtomicUsize::new(0),
        });
        let orchestrator = PredictionOrchestrator::new(cache, service.clone()).with_config(
            OrchestratorConfig::default().with_upstream_timeout(Duration::from_millis(20)),
        );

        let err = orchestrator
            .orchestrate(&PredictionRequest::new(1, "B2", 900.0, 1999))
            .await
            .unwrap_err();

        assert!(matches!(err, PredictionError::UpstreamUnavailable { .. }));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert!(backend.is_empty());
    }
}
