//! # Inference Module
//!
//! Client side of the external price-inference service.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`PredictionService`] | Seam the orchestrator calls on a cache miss |
//! | [`HttpInferenceClient`] | `POST /predict` over HTTP via `reqwest` |
//! | [`InferenceConfig`] | Base URL, path, timeout and pool settings |
//! | [`wire`] | Field renaming and response parsing |
//!
//! No retries are performed: a failure is reported to the caller immediately.

mod http;
pub mod wire;

pub use http::HttpInferenceClient;

use crate::types::{PredictionRequest, Price};
use crate::PredictionError;
use async_trait::async_trait;
use std::time::Duration;

/// Source of fresh predictions.
///
/// Implementations must be shareable across concurrent requests.
#[async_trait]
pub trait PredictionService: Send + Sync {
    /// Predict a price for `request`, already rounded to two fraction digits.
    ///
    /// Fails with [`PredictionError::Upstream`] on a non-success status,
    /// [`PredictionError::UpstreamUnavailable`] on network or timeout failure,
    /// and [`PredictionError::Internal`] on an unusable response body.
    async fn predict(&self, request: &PredictionRequest) -> Result<Price, PredictionError>;
}

#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub base_url: String,
    pub predict_path: String,
    pub timeout: Duration,
    pub pool_max_idle_per_host: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            predict_path: "/predict".to_string(),
            timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 32,
        }
    }
}

impl InferenceConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn with_predict_path(mut self, path: impl Into<String>) -> Self {
        self.predict_path = path.into();
        self
    }
}
