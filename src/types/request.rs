//! Prediction request type and validation.

use crate::{Error, ErrorContext, Result};
use chrono::Datelike;
use serde::{Deserialize, Serialize};

/// Earliest construction year the inference model accepts.
pub const MIN_YEAR_BUILT: u16 = 1000;

/// Property description submitted for a price prediction.
///
/// Fields are private so a request cannot change after it has been keyed.
/// Inbound JSON may use either camelCase names or the upstream column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    #[serde(alias = "BOROUGH")]
    borough: u8,
    #[serde(alias = "BUILDING_CLASS_AT_TIME_OF_SALE")]
    building_class: String,
    #[serde(alias = "GROSS_SQUARE_FEET")]
    gross_square_feet: f64,
    #[serde(alias = "YEAR_BUILT")]
    year_built: u16,
}

impl PredictionRequest {
    pub fn new(
        borough: u8,
        building_class: impl Into<String>,
        gross_square_feet: f64,
        year_built: u16,
    ) -> Self {
        Self {
            borough,
            building_class: building_class.into(),
            gross_square_feet,
            year_built,
        }
    }

    pub fn borough(&self) -> u8 {
        self.borough
    }

    pub fn building_class(&self) -> &str {
        &self.building_class
    }

    pub fn gross_square_feet(&self) -> f64 {
        self.gross_square_feet
    }

    pub fn year_built(&self) -> u16 {
        self.year_built
    }

    /// Validate against the current calendar year.
    pub fn validate(&self) -> Result<()> {
        let year = chrono::Utc::now().year();
        self.validate_at(u16::try_from(year).unwrap_or(u16::MAX))
    }

    /// Validate with an explicit upper bound for `year_built`.
    pub fn validate_at(&self, current_year: u16) -> Result<()> {
        if !(1..=5).contains(&self.borough) {
            return Err(invalid(
                "borough must be between 1 and 5",
                "request.borough",
                self.borough.to_string(),
            ));
        }
        if self.building_class.trim().is_empty() {
            return Err(invalid(
                "building class must not be empty",
                "request.buildingClass",
                format!("{:?}", self.building_class),
            ));
        }
        if !self.gross_square_feet.is_finite() || self.gross_square_feet <= 0.0 {
            return Err(invalid(
                "gross square feet must be a positive number",
                "request.grossSquareFeet",
                self.gross_square_feet.to_string(),
            ));
        }
        if self.year_built < MIN_YEAR_BUILT || self.year_built > current_year {
            return Err(invalid(
                format!("year built must be between {MIN_YEAR_BUILT} and {current_year}"),
                "request.yearBuilt",
                self.year_built.to_string(),
            ));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>, field: &str, actual: String) -> Error {
    Error::validation_with_context(
        msg,
        ErrorContext::new()
            .with_field_path(field)
            .with_details(format!("got {actual}"))
            .with_source("request_validator"),
    )
}
