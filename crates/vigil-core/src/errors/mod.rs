//! Error handling for Vigil.
//! One error enum per subsystem, `thiserror` only.

pub mod backend_error;
pub mod catalog_error;
pub mod config_error;
pub mod detection_error;
pub mod error_code;
pub mod report_error;

pub use backend_error::BackendError;
pub use catalog_error::CatalogError;
pub use config_error::ConfigError;
pub use detection_error::DetectionError;
pub use error_code::VigilErrorCode;
pub use report_error::ReportError;
