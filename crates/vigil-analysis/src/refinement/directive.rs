//! Refinement directives: rule-derived correction instructions for the next attempt.

use serde::{Deserialize, Serialize};

use crate::rules::{Finding, Location, RawMatch, RuleCatalog};
use crate::validation::ValidationResult;

/// Marker attached to an item whose rule was also violated by the
/// immediately preceding attempt.
pub const PERSISTED_FLAG: &str = "PERSISTED: this violation persisted from the previous attempt. Fix it now.";

/// One instruction, keyed by the violated rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveItem {
    pub rule_id: String,
    pub instruction: String,
    /// `line N: text` quotes of the offending matches, when the rule asks
    /// for them.
    pub quotes: Vec<String>,
    pub persisted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementDirective {
    pub items: Vec<DirectiveItem>,
    /// True when any item persisted.
    pub escalated: bool,
}

impl RefinementDirective {
    /// Build a directive from the violations of `current`. `previous` holds
    /// the violations of the attempt before it, if any.
    pub fn synthesize(
        catalog: &RuleCatalog,
        current: &ValidationResult,
        previous: Option<&ValidationResult>,
    ) -> Self {
        let mut items: Vec<DirectiveItem> = Vec::new();
        for finding in &current.violations {
            let persisted = previous.is_some_and(|p| p.has_violation(&finding.rule_id));
            let (instruction, quote) = match catalog.get(&finding.rule_id) {
                Some(rule) => (rule.render_directive(&matches_of(finding)), rule.quote_evidence),
                None => (fallback_instruction(finding), false),
            };
            let quotes = if quote { quotes_of(finding) } else { Vec::new() };

            // A rule split across severities still yields one item.
            if let Some(existing) = items.iter_mut().find(|i| i.rule_id == finding.rule_id) {
                existing.quotes.extend(quotes);
                continue;
            }
            items.push(DirectiveItem {
                rule_id: finding.rule_id.clone(),
                instruction,
                quotes,
                persisted,
            });
        }
        let escalated = items.iter().any(|i| i.persisted);
        Self { items, escalated }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn persisted_rules(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter(|i| i.persisted).map(|i| i.rule_id.as_str())
    }

    /// Render the numbered instruction list.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (n, item) in self.items.iter().enumerate() {
            out.push_str(&format!("{}. [{}] {}\n", n + 1, item.rule_id, item.instruction));
            for quote in &item.quotes {
                out.push_str(&format!("   - {quote}\n"));
            }
            if item.persisted {
                out.push_str(&format!("   {PERSISTED_FLAG}\n"));
            }
        }
        out
    }

    /// The next attempt's prompt: the original requirements, unchanged,
    /// followed by this directive and an excerpt of the rejected candidate.
    pub fn build_prompt(
        &self,
        spec: &str,
        rejected: &ValidationResult,
        rejected_code: &str,
        excerpt_chars: usize,
    ) -> String {
        let mut prompt = String::with_capacity(spec.len() + 512 + excerpt_chars);
        prompt.push_str(spec.trim_end());
        prompt.push_str("\n\n## Required corrections\n");
        prompt.push_str(&format!(
            "The previous candidate was rejected (compliance score {}/100). \
             Keep every original requirement above and fix each item below.\n",
            rejected.compliance_score
        ));
        if self.escalated {
            prompt.push_str("Some violations repeated from the attempt before. They must be fixed in this attempt.\n");
        }
        prompt.push('\n');
        prompt.push_str(&self.render());
        prompt.push_str("\n## Previous candidate (excerpt)\n```\n");
        prompt.push_str(&excerpt(rejected_code, excerpt_chars));
        prompt.push_str("\n```\n");
        prompt
    }
}

/// The first `max_chars` chars of `code`, marked when cut.
pub fn excerpt(code: &str, max_chars: usize) -> String {
    match code.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}\n... [truncated]", &code[..cut]),
        None => code.to_string(),
    }
}

/// Rebuild positioned matches from a finding so rule templates can render.
fn matches_of(finding: &Finding) -> Vec<RawMatch> {
    finding
        .evidence
        .iter()
        .map(|e| RawMatch {
            offset: None,
            location: e.line.map(|line| Location { line, column: None }),
            text: e.text.clone(),
            line_text: e.line_text.clone(),
        })
        .collect()
}

fn quotes_of(finding: &Finding) -> Vec<String> {
    finding
        .evidence
        .iter()
        .map(|e| match (e.line, e.line_text.as_deref()) {
            (Some(line), Some(full)) => format!("line {line}: `{}` in `{full}`", e.text),
            (Some(line), None) => format!("line {line}: `{}`", e.text),
            (None, _) => format!("`{}`", e.text),
        })
        .collect()
}

fn fallback_instruction(finding: &Finding) -> String {
    match finding.suggestion {
        Some(ref s) => format!("{}. {s}", finding.message),
        None => finding.message.clone(),
    }
}
