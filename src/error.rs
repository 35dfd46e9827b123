use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "request.borough", "REDIS_URL")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected range, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "request_validator", "inference_client")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Failures that can escape the prediction orchestrator.
///
/// This is a closed set: cache backend failures never appear here because the
/// cache store absorbs them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    /// The inference service answered with a non-success status.
    #[error("Upstream error: HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The inference service could not be reached or did not answer in time.
    #[error("Upstream unavailable: {message}")]
    UpstreamUnavailable { message: String },

    /// Anything else: malformed upstream payloads, non-finite predictions, bugs.
    #[error("Internal error: {message}{}", format_context(.context))]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl PredictionError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        PredictionError::UpstreamUnavailable {
            message: msg.into(),
        }
    }

    pub fn internal_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        PredictionError::Internal {
            message: msg.into(),
            context,
        }
    }
}

/// Unified error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },

    #[error("Cache backend error: {message}{}", format_context(.context))]
    Cache {
        message: String,
        context: ErrorContext,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] PredictionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new cache backend error with structured context
    pub fn cache_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Cache {
            message: msg.into(),
            context,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. }
            | Error::Validation { context, .. }
            | Error::Cache { context, .. } => Some(context),
            Error::Prediction(PredictionError::Internal { context, .. }) => Some(context),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_is_rendered_in_display() {
        let err = Error::validation_with_context(
            "borough out of range",
            ErrorContext::new()
                .with_field_path("request.borough")
                .with_source("request_validator"),
        );
        assert_eq!(
            err.to_string(),
            "Validation error: borough out of range (field: request.borough, source: request_validator)"
        );
    }

    #[test]
    fn empty_context_renders_nothing() {
        let err = PredictionError::internal_with_context("boom", ErrorContext::new());
        assert_eq!(err.to_string(), "Internal error: boom");
    }

    #[test]
    fn internal_prediction_context_is_reachable_through_crate_error() {
        let err: Error = PredictionError::internal_with_context(
            "bad payload",
            ErrorContext::new().with_source("inference_client"),
        )
        .into();
        assert_eq!(
            err.context().and_then(|c| c.source.as_deref()),
            Some("inference_client")
        );
    }
}
