//! Reporter errors.

use super::error_code::{self, VigilErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report serialization failed: {0}")]
    Serialization(String),

    #[error("Unknown report format: {0}")]
    UnknownFormat(String),
}

impl VigilErrorCode for ReportError {
    fn error_code(&self) -> &'static str {
        error_code::REPORT_ERROR
    }
}
