//! Environment-driven service configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `ML_SERVICE_URL` | `http://localhost:8000` |
//! | `REDIS_URL` | `redis://localhost:6379` |
//! | `PREDICTION_CACHE_BACKEND` | `redis` (`memory`, `none`) |
//! | `PREDICTION_CACHE_PREFIX` | `prediction` |
//! | `PREDICTION_CACHE_TTL_SECS` | `3600` |
//! | `PREDICTION_CACHE_TIMEOUT_MS` | `250` |
//! | `PREDICTION_CACHE_MAX_ENTRIES` | `10000` (memory backend only) |
//! | `PREDICTION_UPSTREAM_TIMEOUT_SECS` | `10` |
//! | `PREDICTION_KEY_SALT` | unset |
//!
//! Unparseable numbers fall back to their defaults.

use crate::cache::{
    CacheBackend, CacheConfig, CacheKeyBuilder, CacheStore, MemoryCache, NullCache, RedisCache,
};
use crate::inference::{HttpInferenceClient, InferenceConfig};
use crate::orchestrator::{OrchestratorConfig, PredictionOrchestrator};
use crate::{Error, ErrorContext, Result};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    Redis,
    Memory,
    None,
}

impl FromStr for CacheBackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            "none" | "off" | "disabled" => Ok(Self::None),
            other => Err(Error::configuration_with_context(
                format!("unknown cache backend: {other}"),
                ErrorContext::new()
                    .with_field_path("PREDICTION_CACHE_BACKEND")
                    .with_details("expected one of: redis, memory, none"),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub ml_service_url: String,
    pub redis_url: String,
    pub cache_backend: CacheBackendKind,
    pub cache_prefix: String,
    pub cache_ttl: Duration,
    pub cache_timeout: Duration,
    pub cache_max_entries: usize,
    pub upstream_timeout: Duration,
    pub key_salt: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            ml_service_url: "http://localhost:8000".to_string(),
            redis_url: "redis://localhost:6379".to_string(),
            cache_backend: CacheBackendKind::Redis,
            cache_prefix: "prediction".to_string(),
            cache_ttl: Duration::from_secs(3600),
            cache_timeout: Duration::from_millis(250),
            cache_max_entries: 10_000,
            upstream_timeout: Duration::from_secs(10),
            key_salt: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map here).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let number = |name: &str| lookup(name).and_then(|s| s.trim().parse::<u64>().ok());

        let cache_backend = match lookup("PREDICTION_CACHE_BACKEND") {
            Some(s) => s.parse()?,
            None => defaults.cache_backend,
        };

        Ok(Self {
            ml_service_url: lookup("ML_SERVICE_URL").unwrap_or(defaults.ml_service_url),
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            cache_backend,
            cache_prefix: lookup("PREDICTION_CACHE_PREFIX").unwrap_or(defaults.cache_prefix),
            cache_ttl: number("PREDICTION_CACHE_TTL_SECS")
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.cache_ttl),
            cache_timeout: number("PREDICTION_CACHE_TIMEOUT_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis)
                .unwrap_or(defaults.cache_timeout),
            cache_max_entries: number("PREDICTION_CACHE_MAX_ENTRIES")
                .map(|n| n.max(1) as usize)
                .unwrap_or(defaults.cache_max_entries),
            upstream_timeout: number("PREDICTION_UPSTREAM_TIMEOUT_SECS")
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(defaults.upstream_timeout),
            key_salt: lookup("PREDICTION_KEY_SALT").filter(|s| !s.is_empty()),
        })
    }

    pub fn with_ml_service_url(mut self, url: impl Into<String>) -> Self {
        self.ml_service_url = url.into();
        self
    }

    pub fn with_cache_backend(mut self, kind: CacheBackendKind) -> Self {
        self.cache_backend = kind;
        self
    }

    pub fn cache_backend(&self) -> Result<Arc<dyn CacheBackend>> {
        Ok(match self.cache_backend {
            CacheBackendKind::Redis => Arc::new(RedisCache::new(&self.redis_url)?),
            CacheBackendKind::Memory => Arc::new(MemoryCache::new(self.cache_max_entries)),
            CacheBackendKind::None => Arc::new(NullCache::new()),
        })
    }

    pub fn cache_store(&self) -> Result<CacheStore> {
        let config = CacheConfig::new()
            .with_op_timeout(self.cache_timeout)
            .with_key_prefix(self.cache_prefix.clone())
            .with_enabled(self.cache_backend != CacheBackendKind::None);
        Ok(CacheStore::new(config, self.cache_backend()?))
    }

    pub fn inference_config(&self) -> InferenceConfig {
        InferenceConfig::new(self.ml_service_url.clone()).with_timeout(self.upstream_timeout)
    }

    /// Wire up the long-lived collaborators and the orchestrator that shares them.
    pub fn build_orchestrator(&self) -> Result<PredictionOrchestrator> {
        let cache = Arc::new(self.cache_store()?);
        let upstream = Arc::new(HttpInferenceClient::new(&self.inference_config())?);
        let mut keys = CacheKeyBuilder::new();
        if let Some(ref salt) = self.key_salt {
            keys = keys.with_salt(salt.clone());
        }
        Ok(PredictionOrchestrator::new(cache, upstream)
            .with_key_builder(keys)
            .with_config(OrchestratorConfig::default().with_ttl(self.cache_ttl)))
    }
}
