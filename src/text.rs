//! Text helpers
//!
//! Trailing punctuation trimming for user selections and word splitting of
//! decorated descriptions.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::annotations::MarkupPattern;

/// Whitespace and common punctuation at the end of a selection
pub const DEFAULT_TRAILING_PATTERN: &str = r"[\s.,/#!$%^&*;:{}=\-_`~()]+$";

static DEFAULT_TRIMMER: Lazy<TrailingTrimmer> = Lazy::new(|| TrailingTrimmer {
    regex: Regex::new(DEFAULT_TRAILING_PATTERN).unwrap(),
});

static BRACKETED_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[.*?\)").unwrap());

/// Finds the trailing run a user may strip from a selection
#[derive(Debug, Clone)]
pub struct TrailingTrimmer {
    regex: Regex,
}

impl TrailingTrimmer {
    /// Build a trimmer from a character-class pattern anchored at `$`
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn standard() -> &'static TrailingTrimmer {
        &DEFAULT_TRIMMER
    }

    /// Byte length of the trailing run, 0 if none
    pub fn trailing_len(&self, text: &str) -> usize {
        self.regex
            .find_iter(text)
            .find(|m| m.end() == text.len())
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// Text without its trailing run, and the trimmed byte length
    pub fn trim<'t>(&self, text: &'t str) -> (&'t str, usize) {
        let len = self.trailing_len(text);
        (&text[..text.len() - len], len)
    }
}

impl Default for TrailingTrimmer {
    fn default() -> Self {
        Self::standard().clone()
    }
}

pub fn has_trailing_punctuation(text: &str) -> bool {
    TrailingTrimmer::standard().trailing_len(text) > 0
}

/// Remaining text and trimmed byte length
pub fn remove_trailing_punctuation(text: &str) -> (&str, usize) {
    TrailingTrimmer::standard().trim(text)
}

pub fn split_into_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Split a decorated description into words, keeping each markup run whole
pub fn split_into_annotations_and_words(text: &str) -> Vec<&str> {
    let markup = MarkupPattern::any();
    let mut pieces = Vec::new();
    let mut cursor = 0;

    for run in BRACKETED_RUN.find_iter(text) {
        pieces.extend(text[cursor..run.start()].split_whitespace());
        if markup.is_match(run.as_str()) {
            pieces.push(run.as_str());
        } else {
            pieces.extend(run.as_str().split_whitespace());
        }
        cursor = run.end();
    }
    pieces.extend(text[cursor..].split_whitespace());

    pieces
}
