//! Validator: applies every applicable rule to a code unit.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use vigil_core::config::ValidationConfig;
use vigil_core::errors::DetectionError;

use super::result::{ValidationResult, ValidationSummary};
use crate::rules::{
    ids, Classification, ContextClassifier, Evidence, Finding, RawMatch, Rule, RuleCatalog,
    Severity, SourceText, UnitIdentity,
};
use crate::scoring::Scorer;

/// Stateless apart from its read-only catalog; safe to share across threads.
#[derive(Debug, Clone)]
pub struct Validator {
    catalog: Arc<RuleCatalog>,
    classifier: ContextClassifier,
    scorer: Scorer,
}

impl Validator {
    pub fn new(catalog: Arc<RuleCatalog>) -> Self {
        Self {
            catalog,
            classifier: ContextClassifier::default(),
            scorer: Scorer::default(),
        }
    }

    /// Validator with the threshold and context window from config.
    pub fn from_config(catalog: Arc<RuleCatalog>, config: &ValidationConfig) -> Self {
        Self::new(catalog)
            .with_classifier(ContextClassifier::new(config.effective_context_window()))
            .with_scorer(Scorer::new(config.effective_min_score()))
    }

    pub fn with_classifier(mut self, classifier: ContextClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_scorer(mut self, scorer: Scorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn catalog(&self) -> &Arc<RuleCatalog> {
        &self.catalog
    }

    /// Validate one code unit. Never fails: detector errors and panics
    /// become info findings, and an empty unit is reported, not rejected.
    pub fn validate(&self, code: &str, unit: &UnitIdentity) -> ValidationResult {
        self.evaluate(code, unit, None)
    }

    /// Validate raw bytes. Text that is not UTF-8 is decoded lossily and
    /// reported as a critical `malformed-input` finding.
    pub fn validate_bytes(&self, bytes: &[u8], unit: &UnitIdentity) -> ValidationResult {
        match std::str::from_utf8(bytes) {
            Ok(code) => self.evaluate(code, unit, None),
            Err(e) => {
                let error = DetectionError::MalformedInput(format!(
                    "not valid UTF-8 after byte {}",
                    e.valid_up_to()
                ));
                tracing::warn!(unit = %unit.name, error = %error, "malformed input");
                self.evaluate(&String::from_utf8_lossy(bytes), unit, Some(error))
            }
        }
    }

    fn evaluate(
        &self,
        code: &str,
        unit: &UnitIdentity,
        malformed: Option<DetectionError>,
    ) -> ValidationResult {
        let source = SourceText::new(code);
        let rules = self.catalog.applicable_rules(unit.role);
        let mut violations = Vec::new();
        let mut warnings = Vec::new();
        let mut summary = ValidationSummary {
            rules_evaluated: rules.len(),
            lines: source.line_count(),
            bytes: code.len(),
            ..Default::default()
        };

        if let Some(error) = malformed {
            violations.push(Finding {
                rule_id: ids::MALFORMED_INPUT.to_string(),
                severity: Severity::Critical,
                count: 1,
                locations: Vec::new(),
                message: error.to_string(),
                suggestion: Some("Provide the unit as UTF-8 text".to_string()),
                evidence: Vec::new(),
            });
        }

        if source.is_blank() {
            violations.push(Finding {
                rule_id: ids::EMPTY_UNIT.to_string(),
                severity: Severity::Critical,
                count: 1,
                locations: Vec::new(),
                message: "Code unit is empty".to_string(),
                suggestion: Some("Produce the complete implementation".to_string()),
                evidence: Vec::new(),
            });
        }

        for rule in rules {
            let matches = match run_detector(rule, &source) {
                Ok(matches) => matches,
                Err(e) => {
                    tracing::warn!(rule = %rule.id, unit = %unit.name, error = %e, "detector failed");
                    warnings.push(detector_failed(rule, &e));
                    continue;
                }
            };
            tracing::trace!(rule = %rule.id, matches = matches.len(), "rule evaluated");
            if matches.is_empty() {
                continue;
            }

            let mut enforced: BTreeMap<Severity, Vec<RawMatch>> = BTreeMap::new();
            let mut excused: Vec<RawMatch> = Vec::new();
            for m in matches {
                match self.classifier.classify(rule, &source, &m, unit.role) {
                    Classification::Enforced(severity) => enforced.entry(severity).or_default().push(m),
                    Classification::Excused => excused.push(m),
                }
            }

            for (severity, matches) in enforced {
                let finding = Finding {
                    rule_id: rule.id.clone(),
                    severity,
                    count: matches.len(),
                    locations: matches.iter().filter_map(|m| m.location).collect(),
                    message: rule.render_message(&matches),
                    suggestion: rule.suggestion.clone(),
                    evidence: matches.iter().map(evidence).collect(),
                };
                tracing::debug!(rule = %rule.id, %severity, count = finding.count, "finding");
                if severity.is_blocking() {
                    violations.push(finding);
                } else {
                    warnings.push(finding);
                }
            }

            if !excused.is_empty() {
                summary.excused += excused.len();
                tracing::debug!(rule = %rule.id, excused = excused.len(), "matches excused by context");
                warnings.push(Finding {
                    rule_id: format!("{}{}", ids::EXCUSED_PREFIX, rule.id),
                    severity: Severity::Info,
                    count: excused.len(),
                    locations: excused.iter().filter_map(|m| m.location).collect(),
                    message: format!(
                        "{} match(es) of '{}' excused by their context",
                        excused.len(),
                        rule.label
                    ),
                    suggestion: None,
                    evidence: excused.iter().map(evidence).collect(),
                });
            }
        }

        for finding in violations.iter().chain(&warnings) {
            summary.tally(finding);
        }
        let score = self.scorer.score(&violations, &warnings);
        tracing::debug!(
            unit = %unit.name,
            score = score.value,
            compliant = score.compliant,
            violations = violations.len(),
            warnings = warnings.len(),
            "validated"
        );

        ValidationResult {
            unit: unit.clone(),
            violations,
            warnings,
            compliant: score.compliant,
            compliance_score: score.value,
            summary,
        }
    }
}

/// Run a detector, turning a panic into an error.
fn run_detector(rule: &Rule, source: &SourceText<'_>) -> Result<Vec<RawMatch>, DetectionError> {
    match panic::catch_unwind(AssertUnwindSafe(|| rule.detect(source))) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(DetectionError::DetectorPanic {
                id: rule.id.clone(),
                message,
            })
        }
    }
}

fn detector_failed(rule: &Rule, error: &DetectionError) -> Finding {
    Finding {
        rule_id: format!("{}{}", ids::DETECTOR_FAILED_PREFIX, rule.id),
        severity: Severity::Info,
        count: 1,
        locations: Vec::new(),
        message: format!("Rule '{}' could not be evaluated: {error}", rule.label),
        suggestion: None,
        evidence: Vec::new(),
    }
}

fn evidence(m: &RawMatch) -> Evidence {
    Evidence {
        line: m.location.map(|l| l.line),
        text: m.text.clone(),
        line_text: m.line_text.clone(),
    }
}
