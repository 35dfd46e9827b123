//! Caller-facing replies.
//!
//! Maps orchestration outcomes onto a status code and JSON body for whatever
//! transport sits in front of the core:
//!
//! | Outcome | Status | Body |
//! |---------|--------|------|
//! | `Ok(price)` | 200 | `{"prediction":"123456.79"}` |
//! | `Upstream { status, body }` | upstream status | upstream body, verbatim |
//! | `UpstreamUnavailable` | 503 | generic error message |
//! | `Internal` | 500 | generic error message |
//! | validation failure | 400 | field and message |

use crate::types::Price;
use crate::{Error, PredictionError};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL: u16 = 500;
pub const STATUS_UNAVAILABLE: u16 = 503;

const UNAVAILABLE_MESSAGE: &str = "Prediction service unavailable";
const INTERNAL_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionResponse {
    pub prediction: Price,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiReply {
    pub status: u16,
    pub body: String,
}

impl ApiReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn prediction(price: Price) -> Self {
        Self {
            status: STATUS_OK,
            body: json!(PredictionResponse { prediction: price }).to_string(),
        }
    }

    /// Reply for a request rejected before orchestration.
    pub fn validation(err: &Error) -> Self {
        let field = err.context().and_then(|c| c.field_path.clone());
        let message = match err {
            Error::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self {
            status: STATUS_BAD_REQUEST,
            body: json!({ "error": { "message": message, "field": field } }).to_string(),
        }
    }

    pub fn from_result(result: Result<Price, PredictionError>) -> Self {
        match result {
            Ok(price) => Self::prediction(price),
            Err(e) => translate(&e),
        }
    }

    fn generic(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": { "message": message } }).to_string(),
        }
    }
}

/// Translate a prediction failure into the reply the caller sees.
///
/// Upstream rejections keep their status and body so the caller can show the
/// service's own diagnostic. Every other failure gets a generic message; the
/// details go to the log only.
pub fn translate(err: &PredictionError) -> ApiReply {
    match err {
        PredictionError::Upstream { status, body } => {
            warn!(status, "passing through upstream rejection");
            ApiReply {
                status: *status,
                body: body.clone(),
            }
        }
        PredictionError::UpstreamUnavailable { message } => {
            warn!(reason = %message, "inference service unavailable");
            ApiReply::generic(STATUS_UNAVAILABLE, UNAVAILABLE_MESSAGE)
        }
        PredictionError::Internal { .. } => {
            error!(error = %err, "prediction failed");
            ApiReply::generic(STATUS_INTERNAL, INTERNAL_MESSAGE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorContext;

    #[test]
    fn success_body_uses_fixed_point_string() {
        let reply = ApiReply::prediction(Price::from_hundredths(12_345_679));
        assert_eq!(reply.status, 200);
        assert_eq!(reply.body, r#"{"prediction":"123456.79"}"#);
        assert!(reply.is_success());
    }

    #[test]
    fn upstream_rejection_passes_through_verbatim() {
        let body = r#"{"detail":"invalid building class"}"#;
        let reply = translate(&PredictionError::Upstream {
            status: 422,
            body: body.to_string(),
        });
        assert_eq!(reply.status, 422);
        assert_eq!(reply.body, body);
    }

    #[test]
    fn unavailable_is_generic_and_distinct_from_validation() {
        let reply = translate(&PredictionError::unavailable("connection refused"));
        assert_eq!(reply.status, STATUS_UNAVAILABLE);
        assert!(!reply.body.contains("connection refused"));

        let invalid = ApiReply::validation(&Error::validation_with_context(
            "borough must be between 1 and 5",
            ErrorContext::new().with_field_path("request.borough"),
        ));
        assert_eq!(invalid.status, STATUS_BAD_REQUEST);
        assert_ne!(invalid.status, reply.status);
        assert!(invalid.body.contains("request.borough"));
    }

    #[test]
    fn internal_hides_details() {
        let reply = translate(&PredictionError::internal_with_context(
            "malformed prediction response",
            ErrorContext::new().with_details("expected value at line 1"),
        ));
        assert_eq!(reply.status, STATUS_INTERNAL);
        assert_eq!(reply.body, r#"{"error":{"message":"Internal Server Error"}}"#);
    }
}
