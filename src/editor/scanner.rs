//! Stateless line and word scanning over an unstructured buffer.
//!
//! Everything here works lexically on the text: lines are whatever sits
//! between `\n` characters, words and list markers are found with the
//! regular patterns below.
use std::ops::RangeInclusive;

use once_cell::sync::Lazy;
use regex::Regex;

/// Last run of letters/digits on a line, preceded by a non-word character.
pub const TRAILING_WORD_PATTERN: &str = r"(?i)[^a-z0-9]([a-z0-9]+)$";

/// Indentation at the start of a line.
pub const LEADING_WHITESPACE_PATTERN: &str = r"^\s+";

/// Ordered (`1.`), unordered (`*`, `+`, `-`) or blockquote (`>`) marker,
/// after optional indentation.
pub const LIST_MARKER_PATTERN: &str = r"^\s*?([0-9]+\.|\*|\+|-|>)";

static TRAILING_WORD: Lazy<Regex> = Lazy::new(|| compile(TRAILING_WORD_PATTERN));
static LEADING_WHITESPACE: Lazy<Regex> = Lazy::new(|| compile(LEADING_WHITESPACE_PATTERN));
static LIST_MARKER: Lazy<Regex> = Lazy::new(|| compile(LIST_MARKER_PATTERN));

fn compile(pattern: &str) -> Regex {
    // The patterns are constants covered by the tests below.
    Regex::new(pattern).unwrap_or_else(|err| panic!("invalid scanner pattern {pattern:?}: {err}"))
}

/// Text of the line containing `offset`, from the line start up to `offset`.
pub fn line_before(value: &str, offset: usize) -> &str {
    let head = &value[..offset];
    match head.rfind('\n') {
        Some(idx) => &head[idx + 1..],
        None => head,
    }
}

/// Zero-based index of the line containing `offset`.
pub fn line_index(value: &str, offset: usize) -> usize {
    value[..offset].matches('\n').count()
}

/// Lines touched by the selection `[start, end]`.
pub fn covered_lines(value: &str, start: usize, end: usize) -> RangeInclusive<usize> {
    line_index(value, start)..=line_index(value, end)
}

/// The word the user is currently typing: the trailing letter/digit run of
/// the line ending at `offset`. A word that starts the line has no
/// delimiter in front of it and is not reported.
pub fn trailing_word(value: &str, offset: usize) -> Option<&str> {
    TRAILING_WORD
        .captures(line_before(value, offset))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn leading_whitespace(line: &str) -> Option<&str> {
    LEADING_WHITESPACE.find(line).map(|m| m.as_str())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Ordered,
    Unordered,
    Blockquote,
}

/// A list marker found at the start of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMarker<'a> {
    /// The matched prefix, including any indentation in front of the marker.
    pub text: &'a str,
    pub kind: MarkerKind,
}

impl ListMarker<'_> {
    /// Marker text to put on the next line. Ordered markers whose number is
    /// a positive integer are incremented; everything else is repeated as is.
    pub fn continuation(&self) -> String {
        if self.kind != MarkerKind::Ordered {
            return self.text.to_string();
        }

        let indent: String = self.text.chars().filter(|c| c.is_whitespace()).collect();
        let digits = self.text.trim().trim_end_matches('.');
        match digits.parse::<u64>() {
            Ok(n) if n > 0 => match n.checked_add(1) {
                Some(next) => format!("{indent}{next}."),
                None => self.text.to_string(),
            },
            _ => self.text.to_string(),
        }
    }
}

pub fn list_marker(line: &str) -> Option<ListMarker<'_>> {
    let caps = LIST_MARKER.captures(line)?;
    let whole = caps.get(0)?;
    let marker = caps.get(1)?.as_str();
    let kind = match marker {
        "*" | "+" | "-" => MarkerKind::Unordered,
        ">" => MarkerKind::Blockquote,
        _ => MarkerKind::Ordered,
    };
    Some(ListMarker {
        text: whole.as_str(),
        kind,
    })
}
