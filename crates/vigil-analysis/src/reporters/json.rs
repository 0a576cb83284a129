//! JSON reporter: structured JSON output.

use serde_json::json;
use vigil_core::errors::ReportError;

use super::Reporter;
use crate::refinement::RefinementSession;
use crate::validation::ValidationResult;

/// JSON reporter for machine-readable output.
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render_results(&self, results: &[ValidationResult]) -> Result<String, ReportError> {
        let total_violations: usize = results.iter().map(|r| r.violations.len()).sum();
        let output = json!({
            "compliant": results.iter().all(|r| r.compliant),
            "unit_count": results.len(),
            "total_violations": total_violations,
            "units": results,
        });
        serde_json::to_string_pretty(&output).map_err(|e| ReportError::Serialization(e.to_string()))
    }

    fn render_session(&self, session: &RefinementSession) -> Result<String, ReportError> {
        serde_json::to_string_pretty(session).map_err(|e| ReportError::Serialization(e.to_string()))
    }
}
