//! Cache key generation.

use crate::types::PredictionRequest;
use serde::Serialize;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub hash: String,
}

impl CacheKey {
    pub fn new(hash: impl Into<String>) -> Self {
        Self { hash: hash.into() }
    }
    pub fn as_str(&self) -> &str {
        &self.hash
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

impl From<&str> for CacheKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
impl From<String> for CacheKey {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Canonical field layout. Struct fields serialize in declaration order, so the
/// byte string fed to the hasher does not depend on how the request was built.
#[derive(Serialize)]
struct CanonicalFields<'a> {
    borough: u8,
    building_class: &'a str,
    gross_square_feet: f64,
    year_built: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    salt: Option<&'a str>,
}

/// Derives cache keys from prediction requests.
///
/// A salt (typically the deployed model version) moves every key into a fresh
/// namespace without touching the backend.
#[derive(Debug, Clone, Default)]
pub struct CacheKeyBuilder {
    salt: Option<String>,
}

impl CacheKeyBuilder {
    pub fn new() -> Self {
        Self { salt: None }
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = Some(salt.into());
        self
    }

    pub fn build(&self, request: &PredictionRequest) -> CacheKey {
        let fields = CanonicalFields {
            borough: request.borough(),
            building_class: request.building_class(),
            gross_square_feet: request.gross_square_feet(),
            year_built: request.year_built(),
            salt: self.salt.as_deref(),
        };
        // Serializing a plain struct of primitives cannot fail.
        let canonical = serde_json::to_string(&fields).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        CacheKey::new(hash)
    }
}

/// Key for `request` with the default (unsalted) builder.
pub fn build_key(request: &PredictionRequest) -> CacheKey {
    CacheKeyBuilder::new().build(request)
}
