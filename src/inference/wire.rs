//! Upstream wire format.
//!
//! The inference service expects the column names it was trained on. The
//! mapping is fixed and one-to-one:
//!
//! | Request field | Upstream field |
//! |---------------|----------------|
//! | `borough` | `BOROUGH` |
//! | `building_class` | `BUILDING_CLASS_AT_TIME_OF_SALE` |
//! | `gross_square_feet` | `GROSS_SQUARE_FEET` |
//! | `year_built` | `YEAR_BUILT` |

use crate::types::{PredictionRequest, Price};
use crate::{ErrorContext, PredictionError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpstreamPayload<'a> {
    #[serde(rename = "BOROUGH")]
    pub borough: u8,
    #[serde(rename = "BUILDING_CLASS_AT_TIME_OF_SALE")]
    pub building_class: &'a str,
    #[serde(rename = "GROSS_SQUARE_FEET")]
    pub gross_square_feet: f64,
    #[serde(rename = "YEAR_BUILT")]
    pub year_built: u16,
}

impl<'a> From<&'a PredictionRequest> for UpstreamPayload<'a> {
    fn from(req: &'a PredictionRequest) -> Self {
        Self {
            borough: req.borough(),
            building_class: req.building_class(),
            gross_square_feet: req.gross_square_feet(),
            year_built: req.year_built(),
        }
    }
}

/// Success body. The service sends `null` when the model output is not finite.
#[derive(Debug, Deserialize)]
struct UpstreamResponse {
    prediction: Option<f64>,
}

/// Parse a 2xx body and normalize the prediction to two fraction digits.
pub fn parse_prediction(body: &str) -> Result<Price, PredictionError> {
    let parsed: UpstreamResponse = serde_json::from_str(body).map_err(|e| {
        PredictionError::internal_with_context(
            "malformed prediction response",
            ErrorContext::new()
                .with_details(e.to_string())
                .with_source("inference_client"),
        )
    })?;

    let raw = parsed.prediction.ok_or_else(|| {
        PredictionError::internal_with_context(
            "prediction service returned no value",
            ErrorContext::new()
                .with_field_path("response.prediction")
                .with_source("inference_client"),
        )
    })?;

    Price::from_f64(raw).ok_or_else(|| {
        PredictionError::internal_with_context(
            "prediction is not representable as a price",
            ErrorContext::new()
                .with_field_path("response.prediction")
                .with_details(raw.to_string())
                .with_source("inference_client"),
        )
    })
}
