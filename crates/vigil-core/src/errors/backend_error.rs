//! Generation backend errors.

use super::error_code::{self, VigilErrorCode};

/// Errors surfaced by a code-generation backend. Always fatal to the
/// current refinement session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend request failed: {message}")]
    RequestFailed { message: String },

    #[error("Backend returned an empty response")]
    EmptyResponse,

    #[error("Backend timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl VigilErrorCode for BackendError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => error_code::BACKEND_TIMEOUT,
            _ => error_code::BACKEND_ERROR,
        }
    }
}
