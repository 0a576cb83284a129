//! Tests for error codes and messages.

use vigil_core::errors::*;

#[test]
fn test_every_error_has_a_code() {
    let config = ConfigError::FileNotFound { path: "vigil.toml".to_string() };
    assert_eq!(config.error_code(), "CONFIG_ERROR");

    let detection = DetectionError::DetectorPanic {
        id: "no-type-holes".to_string(),
        message: "boom".to_string(),
    };
    assert_eq!(detection.error_code(), "DETECTION_ERROR");

    let catalog = CatalogError::DuplicateRule("tenant-isolation".to_string());
    assert_eq!(catalog.error_code(), "CATALOG_ERROR");

    let backend = BackendError::Timeout { timeout_ms: 3000 };
    assert_eq!(backend.error_code(), "BACKEND_TIMEOUT");
    assert_eq!(BackendError::EmptyResponse.error_code(), "BACKEND_ERROR");

    let report = ReportError::UnknownFormat("xml".to_string());
    assert_eq!(report.error_code(), "REPORT_ERROR");
}

#[test]
fn test_coded_string_format() {
    let err = DetectionError::InvalidPattern("unbalanced (".to_string());
    assert_eq!(err.coded_string(), "[DETECTION_ERROR] Invalid pattern: unbalanced (");
}

#[test]
fn test_catalog_load_error_keeps_detection_code() {
    let err: CatalogError = DetectionError::QueryCompilationFailed("bad regex".to_string()).into();
    assert_eq!(err.error_code(), "DETECTION_ERROR");
    assert_eq!(err.to_string(), "Query compilation failed: bad regex");
}
