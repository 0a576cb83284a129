//! Declarative TOML rule definitions, so the catalog can grow without recompiling.
//!
//! ```toml
//! [[rules]]
//! id = "no-eval"
//! severity = "critical"
//! roles = ["backend", "service"]
//! pattern = '\beval\s*\('
//! message = "eval() at lines {lines}"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use vigil_core::errors::{CatalogError, DetectionError};

use super::detectors::PatternDetector;
use super::types::{Severity, UnitRole};
use super::Rule;

/// A TOML-defined rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlRuleDef {
    pub id: String,
    pub label: Option<String>,
    pub severity: String,
    /// Roles the rule runs against. Empty means every role.
    #[serde(default)]
    pub roles: Vec<String>,
    pub pattern: String,
    /// A pattern whose presence anywhere in the unit clears the rule.
    pub unless: Option<String>,
    pub message: Option<String>,
    pub suggestion: Option<String>,
    pub directive: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// A collection of TOML rule definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlRuleFile {
    #[serde(default)]
    pub rules: Vec<TomlRuleDef>,
}

/// Loader for TOML rule definitions.
pub struct TomlRuleLoader;

impl TomlRuleLoader {
    /// Load rules from a TOML string. Disabled entries are skipped.
    pub fn load_from_str(toml_str: &str) -> Result<Vec<Rule>, CatalogError> {
        let file: TomlRuleFile = toml::from_str(toml_str)
            .map_err(|e| DetectionError::InvalidPattern(format!("TOML parse error: {e}")))?;

        let mut rules = Vec::new();
        for def in file.rules {
            if def.enabled == Some(false) {
                continue;
            }
            rules.push(Self::compile(def)?);
        }
        Ok(rules)
    }

    /// Load rules from a file path.
    pub fn load_from_file(path: &Path) -> Result<Vec<Rule>, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DetectionError::InvalidPattern(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::load_from_str(&content)
    }

    fn compile(def: TomlRuleDef) -> Result<Rule, CatalogError> {
        let severity = Severity::parse_str(&def.severity).ok_or_else(|| CatalogError::UnknownSeverity {
            rule: def.id.clone(),
            value: def.severity.clone(),
        })?;

        let roles = def
            .roles
            .iter()
            .map(|r| {
                UnitRole::parse_str(r).ok_or_else(|| CatalogError::UnknownRole {
                    rule: def.id.clone(),
                    value: r.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if def.pattern.is_empty() {
            return Err(DetectionError::InvalidPattern(format!("rule '{}' has an empty pattern", def.id)).into());
        }
        let with_rule_id = |e: DetectionError| match e {
            DetectionError::QueryCompilationFailed(msg) => {
                DetectionError::QueryCompilationFailed(format!("regex error in rule '{}': {msg}", def.id))
            }
            other => other,
        };
        let mut detector = PatternDetector::new(&[def.pattern.as_str()]).map_err(with_rule_id)?;
        if let Some(ref unless) = def.unless {
            detector = detector.unless(&[unless.as_str()]).map_err(with_rule_id)?;
        }

        let label = def.label.clone().unwrap_or_else(|| def.id.clone());
        let mut rule = Rule::new(def.id.clone(), label, severity, detector);
        if !roles.is_empty() {
            rule = rule.applies_to(&roles);
        }
        if let Some(message) = def.message {
            rule = rule.with_message(message);
        }
        if let Some(suggestion) = def.suggestion {
            rule = rule.with_suggestion(suggestion);
        }
        if let Some(directive) = def.directive {
            rule = rule.with_directive(directive);
        }
        Ok(rule)
    }
}
