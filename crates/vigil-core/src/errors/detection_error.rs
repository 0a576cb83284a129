//! Detection errors.

use super::error_code::{self, VigilErrorCode};

/// Errors that can occur while a rule detector scans a code unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectionError {
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Query compilation failed: {0}")]
    QueryCompilationFailed(String),

    #[error("Detector {id} panicked: {message}")]
    DetectorPanic { id: String, message: String },

    #[error("Malformed input: {0}")]
    MalformedInput(String),
}

impl VigilErrorCode for DetectionError {
    fn error_code(&self) -> &'static str {
        error_code::DETECTION_ERROR
    }
}
