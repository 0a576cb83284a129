//! Context classifier: decides whether a forbidden match is excusable.
//!
//! Exceptions only ever see a bounded window around the match, never the
//! whole unit, and can only make a match more lenient.

use regex::Regex;
use vigil_core::errors::DetectionError;

use super::source::SourceText;
use super::types::{RawMatch, Severity, UnitRole};
use super::Rule;

/// What an exception says about one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The match stands at the rule's severity.
    Forbidden,
    /// The match is excused entirely.
    Allowed,
    /// The match stands at a lower severity.
    Downgrade(Severity),
}

/// The local context an exception may inspect.
#[derive(Debug, Clone, Copy)]
pub struct MatchContext<'a> {
    pub matched: &'a RawMatch,
    /// Text within the classifier's window on both sides of the match.
    pub window: &'a str,
    /// The part of `window` that precedes the match.
    pub before: &'a str,
    pub role: UnitRole,
}

/// A narrow predicate that reclassifies matches of an over-broad detector.
pub trait Exception: Send + Sync {
    fn verdict(&self, ctx: &MatchContext<'_>) -> Verdict;
}

/// Outcome of classifying one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Enforced(Severity),
    Excused,
}

/// Applies rule exceptions to raw matches.
#[derive(Debug, Clone, Copy)]
pub struct ContextClassifier {
    window: usize,
}

impl Default for ContextClassifier {
    fn default() -> Self {
        Self::new(200)
    }
}

impl ContextClassifier {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Classify one match. Matches without a position (absence findings)
    /// have no context and are always enforced.
    pub fn classify(
        &self,
        rule: &Rule,
        source: &SourceText<'_>,
        matched: &RawMatch,
        role: UnitRole,
    ) -> Classification {
        let (Some(exception), Some(offset)) = (rule.exception.as_deref(), matched.offset) else {
            return Classification::Enforced(rule.severity);
        };
        let end = offset + matched.text.len();
        let (from, to) = source.window_bounds(offset, end, self.window);
        let text = source.text();
        let ctx = MatchContext {
            matched,
            window: &text[from..to],
            before: &text[from..offset.max(from)],
            role,
        };
        match exception.verdict(&ctx) {
            Verdict::Forbidden => Classification::Enforced(rule.severity),
            Verdict::Allowed => Classification::Excused,
            // Never harsher than the rule itself.
            Verdict::Downgrade(severity) => {
                Classification::Enforced(rule.severity.most_lenient(severity))
            }
        }
    }

    pub fn is_excused(
        &self,
        rule: &Rule,
        source: &SourceText<'_>,
        matched: &RawMatch,
        role: UnitRole,
    ) -> bool {
        self.classify(rule, source, matched, role) == Classification::Excused
    }
}

/// Excuses type holes that sit in a constrained generic default
/// (`<T extends Base = any>`) or in a declaration labeled as a reusable
/// utility. Both checks are anchored on the match: a constrained default
/// elsewhere in the window excuses nothing.
#[derive(Debug, Clone)]
pub struct GenericPlaceholderException {
    constrained_default: Regex,
    utility_label: Regex,
}

impl GenericPlaceholderException {
    pub fn new() -> Result<Self, DetectionError> {
        let compile = |p: &str| {
            Regex::new(p).map_err(|e| DetectionError::QueryCompilationFailed(e.to_string()))
        };
        Ok(Self {
            constrained_default: compile(r"^<\s*[A-Za-z_$][\w$]*\s+extends\s+[^;{}()=]+=[^>=]")?,
            utility_label: compile(r"(?i)(?://|/\*|\*|#)\s*@?(?:utility|reusable)\b")?,
        })
    }

    /// The match is the default of a constrained type parameter whose `<`
    /// opens earlier on the same statement.
    fn in_constrained_default(&self, ctx: &MatchContext<'_>) -> bool {
        let before = ctx.before;
        for (lt, _) in before.rmatch_indices('<') {
            let head = &before[lt..];
            if head.contains([';', '{', '}', '\n']) {
                return false;
            }
            let span = format!("{head}{}", ctx.matched.text);
            if self.constrained_default.is_match(&span) {
                return true;
            }
        }
        false
    }

    /// The label sits on the match's own line or in the comment and
    /// decorator lines directly above it.
    fn labeled_utility(&self, ctx: &MatchContext<'_>) -> bool {
        let mut lines = ctx.before.rsplit('\n');
        if lines.next().is_some_and(|own| self.utility_label.is_match(own)) {
            return true;
        }
        lines
            .map(str::trim)
            .take_while(|l| {
                ["//", "/*", "*", "#", "@"].iter().any(|p| l.starts_with(p))
            })
            .any(|l| self.utility_label.is_match(l))
    }
}

impl Exception for GenericPlaceholderException {
    fn verdict(&self, ctx: &MatchContext<'_>) -> Verdict {
        if ctx.role == UnitRole::Utility
            || self.in_constrained_default(ctx)
            || self.labeled_utility(ctx)
        {
            Verdict::Allowed
        } else {
            Verdict::Forbidden
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict_for(code: &str, needle: &str, role: UnitRole) -> Verdict {
        let source = SourceText::new(code);
        let start = code.find(needle).unwrap();
        let matched = source.match_at(start, start + needle.len());
        let (from, to) = source.window_bounds(start, start + needle.len(), 200);
        let ctx = MatchContext {
            matched: &matched,
            window: &code[from..to],
            before: &code[from..start],
            role,
        };
        GenericPlaceholderException::new().unwrap().verdict(&ctx)
    }

    #[test]
    fn constrained_default_is_allowed() {
        let code = "type Box<T extends object = any> = { v: T };";
        assert_eq!(verdict_for(code, "= any>", UnitRole::Frontend), Verdict::Allowed);

        let nested = "function f<T extends Array<string> = any>() {}";
        assert_eq!(verdict_for(nested, "= any>", UnitRole::Frontend), Verdict::Allowed);
    }

    #[test]
    fn neighbouring_default_does_not_cover_another_hole() {
        let code = "type Box<T extends object = any> = { v: T };\nfunction handle(payload: any) {}";
        assert_eq!(verdict_for(code, ": any", UnitRole::Frontend), Verdict::Forbidden);
    }

    #[test]
    fn unconstrained_generic_is_forbidden() {
        let code = "const m = new Map<string, any>();";
        assert_eq!(verdict_for(code, ", any>", UnitRole::Frontend), Verdict::Forbidden);
    }

    #[test]
    fn utility_label_must_head_the_declaration() {
        let labeled = "// @utility\n/** identity */\nexport function id(x: any) { return x; }";
        assert_eq!(verdict_for(labeled, ": any", UnitRole::Frontend), Verdict::Allowed);

        let distant = "// reusable helpers\nconst a = 1;\nexport function id(x: any) { return x; }";
        assert_eq!(verdict_for(distant, ": any", UnitRole::Frontend), Verdict::Forbidden);

        let inline = "export function id(x: any /* @utility */) { return x; }";
        assert_eq!(verdict_for(inline, ": any", UnitRole::Frontend), Verdict::Forbidden);
    }

    #[test]
    fn utility_role_is_allowed() {
        assert_eq!(verdict_for("let v: any = 1;", ": any", UnitRole::Utility), Verdict::Allowed);
    }
}
