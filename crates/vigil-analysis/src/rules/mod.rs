//! Rules engine: rule definitions, detectors, exceptions, and the catalog.

pub mod builtin;
pub mod catalog;
pub mod detectors;
pub mod exceptions;
pub mod source;
pub mod toml_rules;
pub mod types;

pub use catalog::{CatalogOptions, RuleCatalog};
pub use detectors::Detector;
pub use exceptions::{Classification, ContextClassifier, Exception, Verdict};
pub use source::SourceText;
pub use toml_rules::TomlRuleLoader;
pub use types::*;

use std::fmt;

use vigil_core::errors::DetectionError;

/// Ids of the built-in rules and of the findings the validator synthesizes.
pub mod ids {
    pub const NO_TYPE_HOLES: &str = "no-type-holes";
    pub const TENANT_ISOLATION: &str = "tenant-isolation";
    pub const ASYNC_ERROR_CONTAINMENT: &str = "async-error-containment";
    pub const NO_STAND_IN_CONTENT: &str = "no-stand-in-content";
    pub const ARCHITECTURE_TRIAD: &str = "architecture-triad";
    pub const IMPORT_PRESENCE: &str = "import-presence";
    pub const INPUT_SCHEMA_VALIDATION: &str = "input-schema-validation";
    pub const STRUCTURED_LOGGING: &str = "structured-logging";
    pub const NO_HARDCODED_ENDPOINTS: &str = "no-hardcoded-endpoints";
    pub const ENV_SOURCED_SECRETS: &str = "env-sourced-secrets";

    pub const EMPTY_UNIT: &str = "empty-unit";
    pub const MALFORMED_INPUT: &str = "malformed-input";
    pub const EXCUSED_PREFIX: &str = "excused/";
    pub const DETECTOR_FAILED_PREFIX: &str = "detector-failed/";
}

/// A named policy check. Immutable once built.
///
/// `message` and `directive` are templates; `{count}`, `{lines}`,
/// `{items}` and `{label}` are substituted from the rule's matches.
pub struct Rule {
    pub id: String,
    pub label: String,
    pub severity: Severity,
    pub applicability: Applicability,
    pub detector: Box<dyn Detector>,
    pub exception: Option<Box<dyn Exception>>,
    pub message: String,
    pub suggestion: Option<String>,
    /// Correction instruction used when the rule blocks a refinement attempt.
    pub directive: Option<String>,
    /// Quote each offending text and its line back to the generator.
    pub quote_evidence: bool,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("severity", &self.severity)
            .field("applicability", &self.applicability)
            .field("exception", &self.exception.as_ref().map(|_| "<Exception>"))
            .field("message", &self.message)
            .field("suggestion", &self.suggestion)
            .field("directive", &self.directive)
            .field("quote_evidence", &self.quote_evidence)
            .finish()
    }
}

impl Rule {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        severity: Severity,
        detector: impl Detector + 'static,
    ) -> Self {
        let label = label.into();
        Self {
            id: id.into(),
            message: label.clone(),
            label,
            severity,
            applicability: Applicability::Any,
            detector: Box::new(detector),
            exception: None,
            suggestion: None,
            directive: None,
            quote_evidence: false,
        }
    }

    pub fn applies_to(mut self, roles: &[UnitRole]) -> Self {
        self.applicability = Applicability::roles(roles);
        self
    }

    pub fn with_exception(mut self, exception: impl Exception + 'static) -> Self {
        self.exception = Some(Box::new(exception));
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    pub fn quoting_evidence(mut self) -> Self {
        self.quote_evidence = true;
        self
    }

    pub fn detect(&self, source: &SourceText<'_>) -> Result<Vec<RawMatch>, DetectionError> {
        self.detector.detect(source)
    }

    pub fn render_message(&self, matches: &[RawMatch]) -> String {
        render_template(&self.message, &self.label, matches)
    }

    /// The refinement instruction for these matches, falling back to the
    /// message and suggestion when the rule has no directive template.
    pub fn render_directive(&self, matches: &[RawMatch]) -> String {
        match self.directive {
            Some(ref template) => render_template(template, &self.label, matches),
            None => {
                let message = self.render_message(matches);
                match self.suggestion {
                    Some(ref s) => format!("{message}. {s}"),
                    None => message,
                }
            }
        }
    }
}

/// Substitute `{count}`, `{lines}`, `{items}`, `{label}` in a template.
pub fn render_template(template: &str, label: &str, matches: &[RawMatch]) -> String {
    let lines = join_lines(matches.iter().filter_map(|m| m.location.map(|l| l.line)));
    let mut items: Vec<&str> = Vec::new();
    for m in matches {
        if !items.contains(&m.text.as_str()) {
            items.push(m.text.as_str());
        }
    }
    template
        .replace("{count}", &matches.len().to_string())
        .replace("{lines}", &lines)
        .replace("{items}", &items.join(", "))
        .replace("{label}", label)
}

/// "3, 7, 12" with duplicates removed, or "unknown" when nothing is located.
pub fn join_lines(lines: impl Iterator<Item = u32>) -> String {
    let mut lines: Vec<u32> = lines.collect();
    lines.dedup();
    if lines.is_empty() {
        return "unknown".to_string();
    }
    lines.iter().map(u32::to_string).collect::<Vec<_>>().join(", ")
}
