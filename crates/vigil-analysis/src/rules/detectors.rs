//! Detectors: pattern and structural heuristics that find raw matches.
//!
//! Detection is textual. Rules only see the `Detector` trait, so a
//! structural strategy can replace any of these per rule.

use aho_corasick::{AhoCorasick, MatchKind};
use regex::Regex;
use vigil_core::errors::DetectionError;

use super::source::SourceText;
use super::types::RawMatch;

/// Finds raw matches of one rule in a code unit. Must be a pure read.
pub trait Detector: Send + Sync {
    fn detect(&self, source: &SourceText<'_>) -> Result<Vec<RawMatch>, DetectionError>;
}

fn compile(pattern: &str) -> Result<Regex, DetectionError> {
    Regex::new(pattern)
        .map_err(|e| DetectionError::QueryCompilationFailed(format!("{pattern}: {e}")))
}

/// Join alternatives into one regex so overlapping hits collapse into the
/// leftmost match.
fn compile_alternatives(patterns: &[&str]) -> Result<Regex, DetectionError> {
    if patterns.is_empty() {
        return Err(DetectionError::InvalidPattern("no patterns given".to_string()));
    }
    let joined = patterns
        .iter()
        .map(|p| format!("(?:{p})"))
        .collect::<Vec<_>>()
        .join("|");
    compile(&joined)
}

/// Reports every occurrence of a pattern, unless a clearing pattern occurs
/// anywhere in the unit.
///
/// With `unless` this expresses co-occurrence rules: "storage calls require
/// an ownership filter", "request input requires schema validation".
#[derive(Debug, Clone)]
pub struct PatternDetector {
    pattern: Regex,
    unless: Option<Regex>,
}

impl PatternDetector {
    pub fn new(patterns: &[&str]) -> Result<Self, DetectionError> {
        Ok(Self {
            pattern: compile_alternatives(patterns)?,
            unless: None,
        })
    }

    pub fn unless(mut self, patterns: &[&str]) -> Result<Self, DetectionError> {
        self.unless = Some(compile_alternatives(patterns)?);
        Ok(self)
    }

    /// Clear the rule when any of the given identifiers appears as a word.
    /// An empty word list leaves the detector unconditional.
    pub fn unless_words(self, words: &[String]) -> Result<Self, DetectionError> {
        if words.iter().all(|w| w.is_empty()) {
            return Ok(self);
        }
        let escaped: Vec<String> = words
            .iter()
            .filter(|w| !w.is_empty())
            .map(|w| format!(r"\b{}\b", regex::escape(w)))
            .collect();
        let refs: Vec<&str> = escaped.iter().map(String::as_str).collect();
        self.unless(&refs)
    }
}

impl Detector for PatternDetector {
    fn detect(&self, source: &SourceText<'_>) -> Result<Vec<RawMatch>, DetectionError> {
        if let Some(ref unless) = self.unless {
            if unless.is_match(source.text()) {
                return Ok(Vec::new());
            }
        }
        Ok(self
            .pattern
            .find_iter(source.text())
            .filter(|m| !m.as_str().is_empty())
            .map(|m| source.match_at(m.start(), m.end()))
            .collect())
    }
}

/// Literal marker search. Word-like markers must stand alone, so `TODO`
/// does not fire inside `TODOS` or `todoList`.
#[derive(Debug, Clone)]
pub struct MarkerDetector {
    exact: AhoCorasick,
    folded: AhoCorasick,
}

impl MarkerDetector {
    pub fn new(case_sensitive: &[&str], case_insensitive: &[&str]) -> Result<Self, DetectionError> {
        let build = |markers: &[&str], fold: bool| {
            AhoCorasick::builder()
                .ascii_case_insensitive(fold)
                .match_kind(MatchKind::LeftmostLongest)
                .build(markers)
                .map_err(|e| DetectionError::InvalidPattern(e.to_string()))
        };
        Ok(Self {
            exact: build(case_sensitive, false)?,
            folded: build(case_insensitive, true)?,
        })
    }

    fn stands_alone(text: &str, start: usize, end: usize) -> bool {
        let is_word = |c: char| c.is_alphanumeric() || c == '_';
        let matched = &text[start..end];
        let first_is_word = matched.chars().next().is_some_and(is_word);
        let last_is_word = matched.chars().next_back().is_some_and(is_word);

        if first_is_word && text[..start].chars().next_back().is_some_and(is_word) {
            return false;
        }
        if last_is_word && text[end..].chars().next().is_some_and(is_word) {
            return false;
        }
        true
    }
}

impl Detector for MarkerDetector {
    fn detect(&self, source: &SourceText<'_>) -> Result<Vec<RawMatch>, DetectionError> {
        let text = source.text();
        let mut spans: Vec<(usize, usize)> = self
            .exact
            .find_iter(text)
            .chain(self.folded.find_iter(text))
            .map(|m| (m.start(), m.end()))
            .filter(|&(s, e)| Self::stands_alone(text, s, e))
            .collect();
        spans.sort_unstable();
        spans.dedup_by(|next, prev| next.0 < prev.1);

        Ok(spans
            .into_iter()
            .map(|(s, e)| source.match_at(s, e))
            .collect())
    }
}

/// Reports each named collaborator the unit never mentions.
#[derive(Debug, Clone)]
pub struct RequiredNamesDetector {
    names: Vec<(String, Regex)>,
}

impl RequiredNamesDetector {
    pub fn new(names: &[String]) -> Result<Self, DetectionError> {
        let names = names
            .iter()
            .filter(|n| !n.is_empty())
            .map(|n| Ok((n.clone(), compile(&format!(r"\b{}\b", regex::escape(n)))?)))
            .collect::<Result<Vec<_>, DetectionError>>()?;
        Ok(Self { names })
    }
}

impl Detector for RequiredNamesDetector {
    fn detect(&self, source: &SourceText<'_>) -> Result<Vec<RawMatch>, DetectionError> {
        Ok(self
            .names
            .iter()
            .filter(|(_, re)| !re.is_match(source.text()))
            .map(|(name, _)| RawMatch::missing(name.clone()))
            .collect())
    }
}

/// Flags async functions whose body contains no error-handling construct.
///
/// Each body is delimited by brace matching (or indentation for
/// `async def`) and searched for a guard. A function whose body cannot be
/// delimited falls back to the unit-wide count: it passes only when the
/// unit has at least as many guards as async functions.
#[derive(Debug, Clone)]
pub struct AsyncContainmentDetector {
    declaration: Regex,
    guard: Regex,
}

impl AsyncContainmentDetector {
    pub fn new() -> Result<Self, DetectionError> {
        Ok(Self {
            declaration: compile(
                r"\basync\s+(?:function\b|def\b|fn\b)|\basync\s+[A-Za-z_$][\w$]*\s*(?:\(|=>)|\basync\s*\(",
            )?,
            guard: compile(r"\btry\b|\bcatch\b|\bexcept\b")?,
        })
    }

    fn body<'a>(text: &'a str, decl_start: usize, decl_end: usize) -> Option<&'a str> {
        if text[decl_start..decl_end].split_whitespace().nth(1) == Some("def") {
            return Some(Self::indented_body(text, decl_start));
        }
        let open = Self::body_open(text, decl_end)?;
        let close = matching_close(text, open, '{', '}')?;
        Some(&text[open..=close])
    }

    /// Position of the `{` that opens the body, skipping the parameter list.
    fn body_open(text: &str, from: usize) -> Option<usize> {
        let rest = &text[from..];
        let mut cursor = from;
        // Parameter list may already be open (`async (` / `async name(`).
        let params_open = if text[..from].ends_with('(') {
            Some(from - 1)
        } else {
            rest.find(['(', '{', ';']).and_then(|i| {
                (rest.as_bytes()[i] == b'(').then_some(from + i)
            })
        };
        if let Some(open) = params_open {
            cursor = matching_close(text, open, '(', ')')? + 1;
        }
        let tail = &text[cursor..];
        let brace = tail.find('{')?;
        let between = &tail[..brace];
        // A declaration without body, or an arrow with an expression body.
        if between.contains(';') {
            return None;
        }
        if let Some(arrow) = between.find("=>") {
            if !between[arrow + 2..].trim().is_empty() {
                return None;
            }
        }
        Some(cursor + brace)
    }

    fn indented_body(text: &str, decl_start: usize) -> &str {
        let line_start = text[..decl_start].rfind('\n').map_or(0, |i| i + 1);
        let indent = indentation(&text[line_start..]);
        let body_start = text[decl_start..].find('\n').map_or(text.len(), |i| decl_start + i + 1);

        let mut end = body_start;
        for line in text[body_start..].split_inclusive('\n') {
            if !line.trim().is_empty() && indentation(line) <= indent {
                break;
            }
            end += line.len();
        }
        &text[body_start..end]
    }
}

fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// Index of the delimiter closing the one at `open`. String contents are
/// not special-cased.
fn matching_close(text: &str, open: usize, open_ch: char, close_ch: char) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        if c == open_ch {
            depth += 1;
        } else if c == close_ch {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(open + i);
            }
        }
    }
    None
}

impl Detector for AsyncContainmentDetector {
    fn detect(&self, source: &SourceText<'_>) -> Result<Vec<RawMatch>, DetectionError> {
        let text = source.text();
        let declarations: Vec<(usize, usize)> = self
            .declaration
            .find_iter(text)
            .map(|m| (m.start(), m.end()))
            .collect();
        if declarations.is_empty() {
            return Ok(Vec::new());
        }
        let unit_guarded = self.guard.find_iter(text).count() >= declarations.len();

        Ok(declarations
            .into_iter()
            .filter(|&(start, end)| match Self::body(text, start, end) {
                Some(body) => !self.guard.is_match(body),
                None => !unit_guarded,
            })
            .map(|(start, end)| source.match_at(start, end))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(detector: &dyn Detector, code: &str) -> Vec<RawMatch> {
        detector.detect(&SourceText::new(code)).unwrap()
    }

    #[test]
    fn pattern_detector_unless_clears() {
        let d = PatternDetector::new(&[r"\.findMany\s*\("])
            .unwrap()
            .unless(&[r"\btenantId\b"])
            .unwrap();
        assert_eq!(run(&d, "db.user.findMany({})").len(), 1);
        assert!(run(&d, "db.user.findMany({ where: { tenantId } })").is_empty());
    }

    #[test]
    fn marker_detector_respects_word_boundaries() {
        let d = MarkerDetector::new(&["TODO"], &["mockData"]).unwrap();
        assert!(run(&d, "const TODOS = [];").is_empty());
        assert_eq!(run(&d, "// TODO: finish").len(), 1);
        assert_eq!(run(&d, "const MOCKDATA = {}").len(), 1);
        assert!(run(&d, "todo").is_empty());
    }

    #[test]
    fn async_body_with_try_is_guarded() {
        let d = AsyncContainmentDetector::new().unwrap();
        let code = "async function load(opts = {}) {\n  try {\n    await go();\n  } catch (e) {}\n}\n";
        assert!(run(&d, code).is_empty());

        let unguarded = "async function load() {\n  await go();\n}\n";
        let hits = run(&d, unguarded);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].location.unwrap().line, 1);
    }

    #[test]
    fn async_python_body_uses_indentation() {
        let d = AsyncContainmentDetector::new().unwrap();
        let code = "async def a():\n    try:\n        await x()\n    except Exception:\n        pass\n\nasync def b():\n    await y()\n";
        let hits = run(&d, code);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].location.unwrap().line, 7);
    }

    #[test]
    fn expression_arrow_falls_back_to_count() {
        let d = AsyncContainmentDetector::new().unwrap();
        assert_eq!(run(&d, "const f = async (x) => fetch(x);\n").len(), 1);
        assert!(run(&d, "const f = async (x) => fetch(x);\ntry { f(1) } catch (e) {}\n").is_empty());
    }

    #[test]
    fn required_names_reports_missing() {
        let d = RequiredNamesDetector::new(&["Planner".to_string(), "Memory".to_string()]).unwrap();
        let hits = run(&d, "class Agent { planner: Planner }");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "Memory");
        assert!(hits[0].location.is_none());
    }
}
