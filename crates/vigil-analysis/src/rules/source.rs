//! Line-indexed view of a code unit.

use super::types::{Location, RawMatch};

/// Source text with a precomputed line index, shared by every detector in
/// one validation run.
#[derive(Debug, Clone)]
pub struct SourceText<'a> {
    text: &'a str,
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
}

impl<'a> SourceText<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, line_starts }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn line_count(&self) -> usize {
        if self.text.is_empty() {
            0
        } else if self.text.ends_with('\n') {
            self.line_starts.len() - 1
        } else {
            self.line_starts.len()
        }
    }

    /// 1-based line and column (in chars) of a byte offset.
    pub fn location(&self, offset: usize) -> Location {
        let offset = offset.min(self.text.len());
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let start = self.line_starts[idx];
        let column = self.text.get(start..offset).map_or(0, |s| s.chars().count()) + 1;
        Location {
            line: idx as u32 + 1,
            column: Some(column as u32),
        }
    }

    /// Text of a 1-based line, without its terminator.
    pub fn line(&self, line: u32) -> Option<&'a str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)?;
        let end = self
            .line_starts
            .get(idx + 1)
            .map_or(self.text.len(), |next| next - 1);
        self.text.get(start..end).map(|l| l.trim_end_matches('\r'))
    }

    /// Up to `radius` bytes on each side of `[start, end)`, widened to char
    /// boundaries.
    pub fn window(&self, start: usize, end: usize, radius: usize) -> &'a str {
        let (from, to) = self.window_bounds(start, end, radius);
        &self.text[from..to]
    }

    /// Byte range of `window`.
    pub fn window_bounds(&self, start: usize, end: usize, radius: usize) -> (usize, usize) {
        let mut from = start.saturating_sub(radius);
        while !self.text.is_char_boundary(from) {
            from -= 1;
        }
        let mut to = end.saturating_add(radius).min(self.text.len());
        while !self.text.is_char_boundary(to) {
            to += 1;
        }
        (from, to)
    }

    /// Build a positioned match for the span `[start, end)`.
    pub fn match_at(&self, start: usize, end: usize) -> RawMatch {
        let location = self.location(start);
        RawMatch {
            offset: Some(start),
            location: Some(location),
            text: self.text.get(start..end).unwrap_or_default().to_string(),
            line_text: self.line(location.line).map(|l| l.trim().to_string()),
        }
    }
}
