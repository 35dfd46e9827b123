//! # price-cache
//!
//! Cache-aside serving layer for property-price predictions.
//!
//! ## Overview
//!
//! A prediction query is answered from a key-value cache when an identical
//! query was seen recently; otherwise it is forwarded to an external inference
//! service and the (normalized) answer is written back for the next caller.
//!
//! ## Core Behavior
//!
//! - **Canonical keys**: the cache key depends only on the request's field
//!   values, never on construction or serialization order
//! - **Fail-open cache**: a slow or unreachable cache backend degrades to a miss;
//!   it never fails a prediction
//! - **Fixed-point results**: predictions are rounded to two fraction digits
//!   before they are cached or returned, so cached and fresh answers are identical
//! - **Pass-through upstream errors**: a rejection from the inference service
//!   reaches the caller with its original status code and body
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use price_cache::{CacheConfig, CacheStore, HttpInferenceClient, InferenceConfig,
//!     MemoryCache, PredictionOrchestrator, PredictionRequest};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> price_cache::Result<()> {
//!     let cache = Arc::new(CacheStore::new(CacheConfig::default(), Arc::new(MemoryCache::new(1024))));
//!     let upstream = Arc::new(HttpInferenceClient::new(&InferenceConfig::default())?);
//!     let orchestrator = PredictionOrchestrator::new(cache, upstream);
//!
//!     let request = PredictionRequest::new(3, "A1", 1500.0, 1950);
//!     match orchestrator.orchestrate(&request).await {
//!         Ok(price) => println!("{price}"),
//!         Err(e) => eprintln!("{e}"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`types`] | Prediction request and fixed-point price types |
//! | [`cache`] | Key derivation, cache backends and the fail-open store |
//! | [`inference`] | Upstream inference service client |
//! | [`orchestrator`] | The get / compute / set state machine |
//! | [`response`] | Translation of outcomes into caller-facing replies |
//! | [`config`] | Environment-driven service configuration |

pub mod cache;
pub mod config;
pub mod inference;
pub mod orchestrator;
pub mod response;
pub mod types;

pub use cache::{
    build_key, CacheBackend, CacheConfig, CacheKey, CacheKeyBuilder, CacheStats, CacheStore,
    MemoryCache, NullCache, RedisCache,
};
pub use config::{CacheBackendKind, ServiceConfig};
pub use inference::{HttpInferenceClient, InferenceConfig, PredictionService};
pub use orchestrator::{OrchestratorConfig, PredictionOrchestrator};
pub use response::{translate, ApiReply, PredictionResponse};
pub use types::{ParsePriceError, PredictionRequest, Price};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
pub mod error;
pub use error::{Error, ErrorContext, PredictionError};
