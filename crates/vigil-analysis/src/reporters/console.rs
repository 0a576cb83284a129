//! Console reporter: human-readable output with color codes.

use std::fmt::Write as _;

use vigil_core::errors::{ReportError, VigilErrorCode};

use super::Reporter;
use crate::refinement::{ExhaustionReason, Outcome, RefinementSession};
use crate::rules::{Finding, Severity};
use crate::validation::ValidationResult;

/// Console reporter for human-readable terminal output.
pub struct ConsoleReporter {
    pub use_color: bool,
}

impl ConsoleReporter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn color_start(&self, severity: Severity) -> &'static str {
        if !self.use_color {
            return "";
        }
        match severity {
            Severity::Critical => "\x1b[1;31m", // bold red
            Severity::High => "\x1b[31m",       // red
            Severity::Warning => "\x1b[33m",    // yellow
            Severity::Info => "\x1b[36m",       // cyan
        }
    }

    fn color_end(&self) -> &'static str {
        if self.use_color {
            "\x1b[0m"
        } else {
            ""
        }
    }

    fn verdict(&self, compliant: bool) -> String {
        let (color, text) = if compliant {
            ("\x1b[32m", "COMPLIANT ✓")
        } else {
            ("\x1b[31m", "NON-COMPLIANT ✗")
        };
        if self.use_color {
            format!("{color}{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn banner(out: &mut String, title: &str) {
        out.push_str("╔══════════════════════════════════════════╗\n");
        let _ = writeln!(out, "║{title:^42}║");
        out.push_str("╚══════════════════════════════════════════╝\n\n");
    }

    fn write_finding(&self, out: &mut String, finding: &Finding, indent: &str) {
        let cs = self.color_start(finding.severity);
        let ce = self.color_end();
        let _ = write!(out, "{indent}{cs}{}{ce} [{}] {}", finding.severity, finding.rule_id, finding.message);
        if !finding.locations.is_empty() {
            let locs: Vec<String> = finding.locations.iter().map(ToString::to_string).collect();
            let _ = write!(out, " (at {})", locs.join(", "));
        }
        out.push('\n');
        for (line, e) in finding.evidence.iter().filter_map(|e| e.line.map(|l| (l, e))) {
            match e.line_text {
                Some(ref full) if full.as_str() != e.text => {
                    let _ = writeln!(out, "{indent}    {line}: `{}` in `{full}`", e.text);
                }
                _ => {
                    let _ = writeln!(out, "{indent}    {line}: `{}`", e.text);
                }
            }
        }
        if let Some(ref fix) = finding.suggestion {
            let _ = writeln!(out, "{indent}    💡 Fix: {fix}");
        }
    }

    fn write_result(&self, out: &mut String, result: &ValidationResult) {
        let symbol = if result.compliant { "✓" } else { "✗" };
        let _ = writeln!(
            out,
            "{symbol} {} ({}) score: {}/100",
            result.unit.name, result.unit.role, result.compliance_score
        );
        if !result.violations.is_empty() {
            let _ = writeln!(out, "  Violations ({}):", result.violations.len());
            for f in &result.violations {
                self.write_finding(out, f, "    ");
            }
        }
        if !result.warnings.is_empty() {
            let _ = writeln!(out, "  Warnings ({}):", result.warnings.len());
            for f in &result.warnings {
                self.write_finding(out, f, "    ");
            }
        }
        let s = &result.summary;
        let _ = writeln!(
            out,
            "  {} critical, {} high, {} warning, {} info; {} excused; {} rules over {} lines\n",
            s.critical, s.high, s.warning, s.info, s.excused, s.rules_evaluated, s.lines
        );
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Reporter for ConsoleReporter {
    fn name(&self) -> &'static str {
        "console"
    }

    fn render_results(&self, results: &[ValidationResult]) -> Result<String, ReportError> {
        let mut out = String::new();
        Self::banner(&mut out, "Vigil Compliance Report");

        for result in results {
            self.write_result(&mut out, result);
        }

        let compliant = results.iter().filter(|r| r.compliant).count();
        let violations: usize = results.iter().map(|r| r.violations.len()).sum();
        let warnings: usize = results.iter().map(|r| r.warnings.len()).sum();
        let _ = writeln!(
            out,
            "─── Summary: {compliant}/{} units compliant, {violations} violations, {warnings} warnings ───",
            results.len()
        );
        let _ = writeln!(out, "Result: {}", self.verdict(compliant == results.len()));
        Ok(out)
    }

    fn render_session(&self, session: &RefinementSession) -> Result<String, ReportError> {
        let mut out = String::new();
        Self::banner(&mut out, "Vigil Refinement Session");
        let unit = &session.request.unit;
        let _ = writeln!(out, "Unit: {} ({})\n", unit.name, unit.role);

        for attempt in &session.attempts {
            let r = &attempt.result;
            let _ = writeln!(
                out,
                "Attempt {}: score {}/100, {} violation(s), {}",
                attempt.index,
                r.compliance_score,
                r.violations.len(),
                self.verdict(r.compliant)
            );
            for f in &r.violations {
                self.write_finding(&mut out, f, "  ");
            }
            if let Some(ref directive) = attempt.directive {
                let tag = if directive.escalated { " [ESCALATED]" } else { "" };
                let _ = writeln!(out, "  Directive for attempt {}{tag}:", attempt.index + 1);
                for line in directive.render().lines() {
                    let _ = writeln!(out, "    {line}");
                }
            }
            out.push('\n');
        }

        match session.outcome {
            Outcome::Succeeded {
                attempts_used,
                final_score,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "Outcome: {} after {attempts_used} attempt(s), final score {final_score}/100",
                    self.verdict(true)
                );
            }
            Outcome::Exhausted {
                ref last_result,
                attempts_used,
                reason,
            } => {
                let why = match reason {
                    ExhaustionReason::AttemptBudget => "attempt budget exhausted",
                    ExhaustionReason::Deadline => "deadline reached",
                };
                let _ = writeln!(
                    out,
                    "Outcome: EXHAUSTED ({why}) after {attempts_used} attempt(s), {}",
                    self.verdict(false)
                );
                let _ = writeln!(out, "Remaining violations:");
                for f in &last_result.violations {
                    self.write_finding(&mut out, f, "  ");
                }
            }
            Outcome::BackendFailed {
                ref error,
                attempts_used,
            } => {
                let _ = writeln!(
                    out,
                    "Outcome: BACKEND FAILED after {attempts_used} completed attempt(s): {}",
                    error.coded_string()
                );
                if let Some(last) = session.last_attempt() {
                    let _ = writeln!(out, "Last validated candidate had {} violation(s):", last.result.violations.len());
                    for f in &last.result.violations {
                        self.write_finding(&mut out, f, "  ");
                    }
                }
            }
        }
        Ok(out)
    }
}
