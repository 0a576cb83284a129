//! Scorer: reduces findings to a compliance score and verdict.
//!
//! 100 minus a fixed penalty per finding record (critical 25, high 10,
//! warning 5, info 0), floored at 0. A record aggregates every match of
//! one rule, so five matches of one rule cost the same as one.

use serde::{Deserialize, Serialize};

use crate::rules::Finding;

/// Score and verdict for one finding set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub value: u32,
    pub compliant: bool,
}

/// Deterministic scorer with an optional score threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scorer {
    min_score: u32,
}

impl Scorer {
    pub fn new(min_score: u32) -> Self {
        Self {
            min_score: min_score.min(100),
        }
    }

    pub fn min_score(&self) -> u32 {
        self.min_score
    }

    /// Compliant iff there are no violations and the score reaches the
    /// threshold (0 by default, so only violations matter).
    pub fn score(&self, violations: &[Finding], warnings: &[Finding]) -> Score {
        let value = compliance_score(violations.iter().chain(warnings));
        Score {
            value,
            compliant: violations.is_empty() && value >= self.min_score,
        }
    }
}

/// Score with the default threshold.
pub fn score(violations: &[Finding], warnings: &[Finding]) -> Score {
    Scorer::default().score(violations, warnings)
}

/// 100 minus the summed penalties, floored at 0.
pub fn compliance_score<'a>(findings: impl IntoIterator<Item = &'a Finding>) -> u32 {
    let penalty: u32 = findings
        .into_iter()
        .map(|f| f.severity.penalty())
        .fold(0u32, u32::saturating_add);
    100u32.saturating_sub(penalty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Severity;

    fn finding(severity: Severity, count: usize) -> Finding {
        Finding {
            rule_id: format!("r-{severity}"),
            severity,
            count,
            locations: Vec::new(),
            message: String::new(),
            suggestion: None,
            evidence: Vec::new(),
        }
    }

    #[test]
    fn penalty_is_per_record_not_per_match() {
        let one = score(&[finding(Severity::Critical, 5)], &[]);
        assert_eq!(one.value, 75);
        let two = score(
            &[finding(Severity::Critical, 1), finding(Severity::Critical, 1)],
            &[],
        );
        assert_eq!(two.value, 50);
    }

    #[test]
    fn warnings_only_is_compliant_below_100() {
        let s = score(&[], &[finding(Severity::Warning, 1), finding(Severity::Info, 2)]);
        assert_eq!(s.value, 95);
        assert!(s.compliant);
    }

    #[test]
    fn floors_at_zero() {
        let many: Vec<Finding> = (0..10).map(|_| finding(Severity::Critical, 1)).collect();
        assert_eq!(score(&many, &[]).value, 0);
    }

    #[test]
    fn threshold_gates_warning_heavy_units() {
        let scorer = Scorer::new(90);
        let warnings: Vec<Finding> = (0..3).map(|_| finding(Severity::Warning, 1)).collect();
        let s = scorer.score(&[], &warnings);
        assert_eq!(s.value, 85);
        assert!(!s.compliant);
    }
}
