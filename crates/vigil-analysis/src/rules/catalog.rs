//! Rule catalog: the ordered, read-only set of rules a validator applies.
//!
//! Built once and shared (typically behind an `Arc`) by every validator and
//! refinement session. Nothing mutates it after construction.

use std::collections::HashSet;
use std::path::Path;

use vigil_core::config::validation_config::{DEFAULT_ARCHITECTURE_TRIAD, DEFAULT_OWNERSHIP_FIELDS};
use vigil_core::config::ValidationConfig;
use vigil_core::errors::CatalogError;

use super::builtin::builtin_rules;
use super::toml_rules::TomlRuleLoader;
use super::types::UnitRole;
use super::Rule;

/// Domain vocabulary the built-in rules are parameterized with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogOptions {
    /// Identifiers that count as tenant/ownership filtering.
    pub ownership_fields: Vec<String>,
    /// Collaborators every service/agent unit must reference.
    pub architecture_triad: Vec<String>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            ownership_fields: DEFAULT_OWNERSHIP_FIELDS.iter().map(|s| s.to_string()).collect(),
            architecture_triad: DEFAULT_ARCHITECTURE_TRIAD.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl From<&ValidationConfig> for CatalogOptions {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            ownership_fields: config.effective_ownership_fields(),
            architecture_triad: config.effective_architecture_triad(),
        }
    }
}

#[derive(Debug)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Build a catalog, rejecting duplicate rule ids.
    pub fn new(rules: Vec<Rule>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.id.as_str()) {
                return Err(CatalogError::DuplicateRule(rule.id.clone()));
            }
        }
        Ok(Self { rules })
    }

    /// The built-in rule set.
    pub fn builtin(options: &CatalogOptions) -> Result<Self, CatalogError> {
        Self::new(builtin_rules(options)?)
    }

    /// Built-in rules plus `rules_file` (resolved against `root` when
    /// relative), minus `disabled_rules`.
    pub fn from_config(config: &ValidationConfig, root: &Path) -> Result<Self, CatalogError> {
        let mut catalog = Self::builtin(&CatalogOptions::from(config))?;
        if let Some(ref rules_file) = config.rules_file {
            let path = root.join(rules_file);
            let extra = TomlRuleLoader::load_from_file(&path)?;
            tracing::debug!(path = %path.display(), count = extra.len(), "loaded TOML rules");
            catalog = catalog.with_rules(extra)?;
        }
        Ok(catalog.without(&config.disabled_rules))
    }

    /// Append rules after the existing ones.
    pub fn with_rules(self, extra: Vec<Rule>) -> Result<Self, CatalogError> {
        let mut rules = self.rules;
        rules.extend(extra);
        Self::new(rules)
    }

    /// Drop every rule whose id is listed.
    pub fn without(self, ids: &[String]) -> Self {
        if ids.is_empty() {
            return self;
        }
        let rules = self
            .rules
            .into_iter()
            .filter(|r| !ids.iter().any(|id| *id == r.id))
            .collect();
        Self { rules }
    }

    /// Rules that run against `role`, in catalog order.
    pub fn applicable_rules(&self, role: UnitRole) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.applicability.applies_to(role))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
