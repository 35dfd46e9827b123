//! # Prediction Cache Module
//!
//! Key derivation, pluggable backends, and the fail-open store the orchestrator
//! talks to.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`CacheStore`] | Fail-open front with key prefixing, timeouts and statistics |
//! | [`CacheConfig`] | Store behavior: enable switch, per-call timeout, key prefix |
//! | [`CacheBackend`] | Trait for string-keyed backends with optional expiry |
//! | [`RedisCache`] | Redis backend over a shared multiplexed connection |
//! | [`MemoryCache`] | In-process backend with TTL and bounded size |
//! | [`NullCache`] | No-op backend for disabling caching |
//! | [`CacheKeyBuilder`] | Canonical key derivation from a prediction request |
//!
//! ## Example
//!
//! ```rust
//! use price_cache::cache::{CacheConfig, CacheStore, MemoryCache};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let store = CacheStore::new(
//!     CacheConfig::new().with_op_timeout(Duration::from_millis(100)),
//!     Arc::new(MemoryCache::new(1000)),
//! );
//! assert_eq!(store.backend_name(), "memory");
//! ```
//!
//! ## Failure Policy
//!
//! The cache is an optimization. A backend that errors or stalls makes
//! [`CacheStore::get`] return `None` and turns `set`/`delete` into no-ops; the
//! failure is reported through `tracing` and the `errors` counter only.

mod backend;
mod key;
mod redis_store;
mod store;

pub use backend::{CacheBackend, MemoryCache, NullCache};
pub use key::{build_key, CacheKey, CacheKeyBuilder};
pub use redis_store::RedisCache;
pub use store::{CacheConfig, CacheStats, CacheStore};
