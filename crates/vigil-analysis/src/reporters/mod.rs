//! Reporters: render validation results and refinement sessions.
//!
//! Pure presentation: every reporter returns text and never writes it.

pub mod console;
pub mod json;

use vigil_core::errors::ReportError;

use crate::refinement::RefinementSession;
use crate::validation::ValidationResult;

pub trait Reporter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Render the results of a batch of units.
    fn render_results(&self, results: &[ValidationResult]) -> Result<String, ReportError>;

    fn render_session(&self, session: &RefinementSession) -> Result<String, ReportError>;

    fn render_result(&self, result: &ValidationResult) -> Result<String, ReportError> {
        self.render_results(std::slice::from_ref(result))
    }
}

/// Create a reporter by format name.
pub fn create_reporter(format: &str, use_color: bool) -> Result<Box<dyn Reporter>, ReportError> {
    match format {
        "console" => Ok(Box::new(console::ConsoleReporter::new(use_color))),
        "json" => Ok(Box::new(json::JsonReporter)),
        other => Err(ReportError::UnknownFormat(other.to_string())),
    }
}

/// List all available reporter format names.
pub fn available_formats() -> &'static [&'static str] {
    &["console", "json"]
}
