//! # Types Module
//!
//! Core data types shared by the cache, the inference client and the orchestrator.
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PredictionRequest`] | Immutable property description submitted for pricing |
//! | [`Price`] | Fixed-point decimal with exactly two fraction digits |
//!
//! ## Submodules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`request`] | Prediction request and its validation |
//! | [`price`] | Fixed-point price, rounding and string encoding |

pub mod price;
pub mod request;

pub use price::{ParsePriceError, Price};
pub use request::PredictionRequest;
