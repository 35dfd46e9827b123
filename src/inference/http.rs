use super::wire::{parse_prediction, UpstreamPayload};
use super::{InferenceConfig, PredictionService};
use crate::types::{PredictionRequest, Price};
use crate::{Error, ErrorContext, PredictionError, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP client for the inference service.
///
/// Built once and shared; `reqwest::Client` pools connections internally.
pub struct HttpInferenceClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpInferenceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self> {
        let base = url::Url::parse(&config.base_url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid inference service URL: {e}"),
                ErrorContext::new()
                    .with_field_path("ML_SERVICE_URL")
                    .with_details(config.base_url.clone())
                    .with_source("inference_client"),
            )
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout.min(Duration::from_secs(5)))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}{}",
                base.as_str().trim_end_matches('/'),
                config.predict_path
            ),
            timeout: config.timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify_send_error(&self, e: reqwest::Error) -> PredictionError {
        if e.is_builder() {
            return PredictionError::internal_with_context(
                "could not build inference request",
                ErrorContext::new()
                    .with_details(e.to_string())
                    .with_source("inference_client"),
            );
        }
        if e.is_timeout() {
            return PredictionError::unavailable(format!(
                "no response within {}ms",
                self.timeout.as_millis()
            ));
        }
        PredictionError::unavailable(e.to_string())
    }
}

#[async_trait]
impl PredictionService for HttpInferenceClient {
    async fn predict(&self, request: &PredictionRequest) -> std::result::Result<Price, PredictionError> {
        let request_id = uuid::Uuid::new_v4().to_string();
        debug!(url = %self.url, request_id = %request_id, "calling inference service");

        let response = self
            .client
            .post(&self.url)
            .header("x-request-id", request_id.as_str())
            .json(&UpstreamPayload::from(request))
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                request_id = %request_id,
                "inference service rejected request"
            );
            return Err(PredictionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        parse_prediction(&body)
    }
}
