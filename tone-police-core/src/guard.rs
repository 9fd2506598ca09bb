//! Code-block guard.
//!
//! Fenced (```` ``` ````) and inline (`` ` ``) code spans are swapped for
//! placeholders before any substitution runs and swapped back afterwards, so
//! identifiers such as `shit_var` survive untouched.
//!
//! Placeholders are made of Unicode private-use code points only. They contain
//! no word characters, capitals or punctuation, so no normalization or
//! dictionary rule can rewrite them between `protect` and `restore`.
//!
//! License: MIT OR Apache-2.0

use lazy_static::lazy_static;
use regex::Regex;

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';
/// Digit `d` of a placeholder index is encoded as `DIGIT_BASE + d`.
const DIGIT_BASE: u32 = 0xE010;

lazy_static! {
    /// Fenced blocks first so a fence is never split into inline spans.
    static ref CODE_SPAN_REGEX: Regex = Regex::new(r"```[\s\S]*?```|`[^`\n]+`").unwrap();
}

/// A code span lifted out of the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSpan {
    pub index: usize,
    pub text: String,
}

/// Text with its code spans replaced by placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProtectedText {
    pub text: String,
    pub spans: Vec<CodeSpan>,
}

/// Builds the placeholder for span `index`.
pub fn placeholder(index: usize) -> String {
    let mut out = String::new();
    out.push(PLACEHOLDER_OPEN);
    for digit in index.to_string().chars() {
        let offset = digit.to_digit(10).unwrap_or(0);
        // DIGIT_BASE..DIGIT_BASE+9 lies inside the BMP private-use block.
        out.push(char::from_u32(DIGIT_BASE + offset).unwrap_or(PLACEHOLDER_OPEN));
    }
    out.push(PLACEHOLDER_CLOSE);
    out
}

/// Replaces every code span with a placeholder, left to right.
///
/// `spans[i]` is always the literal text placeholder `i` replaced.
pub fn protect(text: &str) -> ProtectedText {
    let mut spans = Vec::new();
    let protected = CODE_SPAN_REGEX.replace_all(text, |caps: &regex::Captures| {
        let index = spans.len();
        spans.push(CodeSpan {
            index,
            text: caps[0].to_string(),
        });
        placeholder(index)
    });
    if !spans.is_empty() {
        log::debug!("Protected {} code span(s).", spans.len());
    }
    ProtectedText {
        text: protected.into_owned(),
        spans,
    }
}

/// Puts the protected spans back, in ascending index order.
pub fn restore(text: &str, spans: &[CodeSpan]) -> String {
    let mut restored = text.to_string();
    for span in spans {
        restored = restored.replace(&placeholder(span.index), &span.text);
    }
    restored
}
