//! Validator and rule catalog configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_OWNERSHIP_FIELDS: &[&str] = &[
    "tenant_id",
    "tenantId",
    "organization_id",
    "organizationId",
    "org_id",
    "orgId",
    "owner_id",
    "ownerId",
];

pub const DEFAULT_ARCHITECTURE_TRIAD: &[&str] = &["Repository", "Validator", "Logger"];

/// Configuration for the validator.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ValidationConfig {
    /// Minimum compliance score for a unit to be compliant (0-100). Default: 0.
    pub min_score: Option<u32>,
    /// Rule ids removed from the catalog.
    pub disabled_rules: Vec<String>,
    /// Identifiers that count as tenant/ownership filtering.
    pub ownership_fields: Vec<String>,
    /// Collaborators every service/agent unit must reference.
    pub architecture_triad: Vec<String>,
    /// Characters inspected on each side of a match by rule exceptions. Default: 200.
    pub context_window: Option<usize>,
    /// Path to a TOML file of additional rules.
    pub rules_file: Option<String>,
}

impl ValidationConfig {
    pub fn effective_min_score(&self) -> u32 {
        self.min_score.unwrap_or(0)
    }

    pub fn effective_context_window(&self) -> usize {
        self.context_window.unwrap_or(200)
    }

    pub fn effective_ownership_fields(&self) -> Vec<String> {
        if self.ownership_fields.is_empty() {
            DEFAULT_OWNERSHIP_FIELDS.iter().map(|s| s.to_string()).collect()
        } else {
            self.ownership_fields.clone()
        }
    }

    pub fn effective_architecture_triad(&self) -> Vec<String> {
        if self.architecture_triad.is_empty() {
            DEFAULT_ARCHITECTURE_TRIAD.iter().map(|s| s.to_string()).collect()
        } else {
            self.architecture_triad.clone()
        }
    }
}
