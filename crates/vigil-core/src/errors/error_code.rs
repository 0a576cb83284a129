//! Stable error codes for callers that match on strings (logs, CI output).

/// Every Vigil error enum implements this to expose a structured code.
pub trait VigilErrorCode {
    /// Returns the error code string (e.g., "CONFIG_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted string: `[ERROR_CODE] message`.
    fn coded_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const DETECTION_ERROR: &str = "DETECTION_ERROR";
pub const CATALOG_ERROR: &str = "CATALOG_ERROR";
pub const BACKEND_ERROR: &str = "BACKEND_ERROR";
pub const BACKEND_TIMEOUT: &str = "BACKEND_TIMEOUT";
pub const REPORT_ERROR: &str = "REPORT_ERROR";
