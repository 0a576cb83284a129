//! Validation result types.

use serde::{Deserialize, Serialize};

use crate::rules::{Finding, Severity, UnitIdentity};

/// Output of one validator run over one code unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub unit: UnitIdentity,
    /// Critical and high findings, in catalog order.
    pub violations: Vec<Finding>,
    /// Warning and info findings, in catalog order.
    pub warnings: Vec<Finding>,
    pub compliant: bool,
    /// 0..=100.
    pub compliance_score: u32,
    pub summary: ValidationSummary,
}

/// Counts by severity and code-unit size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub critical: usize,
    pub high: usize,
    pub warning: usize,
    pub info: usize,
    /// Matches excused by a rule exception.
    pub excused: usize,
    pub rules_evaluated: usize,
    pub lines: usize,
    pub bytes: usize,
}

impl ValidationSummary {
    pub(crate) fn tally(&mut self, finding: &Finding) {
        match finding.severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Warning => self.warning += 1,
            Severity::Info => self.info += 1,
        }
    }
}

impl ValidationResult {
    /// Every finding, violations first.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.violations.iter().chain(self.warnings.iter())
    }

    /// Ids of the rules with blocking findings.
    pub fn violated_rules(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::new();
        for f in &self.violations {
            if !ids.contains(&f.rule_id.as_str()) {
                ids.push(f.rule_id.as_str());
            }
        }
        ids
    }

    pub fn has_violation(&self, rule_id: &str) -> bool {
        self.violations.iter().any(|f| f.rule_id == rule_id)
    }

    /// Process exit code for script/CI use: 0 compliant, 1 not.
    pub fn exit_code(&self) -> i32 {
        if self.compliant {
            0
        } else {
            1
        }
    }
}
