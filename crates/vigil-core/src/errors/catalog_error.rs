//! Rule catalog construction errors.

use super::detection_error::DetectionError;
use super::error_code::{self, VigilErrorCode};

/// Errors raised while assembling a rule catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Duplicate rule id: {0}")]
    DuplicateRule(String),

    #[error("Unknown severity '{value}' in rule {rule}")]
    UnknownSeverity { rule: String, value: String },

    #[error("Unknown role '{value}' in rule {rule}")]
    UnknownRole { rule: String, value: String },

    #[error(transparent)]
    Load(#[from] DetectionError),
}

impl VigilErrorCode for CatalogError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Load(inner) => inner.error_code(),
            _ => error_code::CATALOG_ERROR,
        }
    }
}
