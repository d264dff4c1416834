//! Inline annotation markup
//!
//! Decorated descriptions embed annotations as `[mention text](annotation id)`.
//! Mention text may not contain `]`; the id is matched by a caller-supplied
//! pattern. Anything that does not match is literal text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Id pattern accepting any non-empty id (lazily, up to the first `)`)
pub const ANY_ID: &str = ".+?";

static ANY_MARKUP: Lazy<MarkupPattern> = Lazy::new(|| MarkupPattern {
    regex: Regex::new(&markup_regex(ANY_ID)).unwrap(),
});

fn markup_regex(id_pattern: &str) -> String {
    format!(r"\[(?P<text>[^\]]*?)\]\((?P<id>{})\)", id_pattern)
}

/// Format a mention as inline markup
pub fn format_markup(text: &str, id: &str) -> String {
    format!("[{}]({})", text, id)
}

/// Whether `text` holds markup for exactly `id`.
///
/// Same answer as [`MarkupPattern::for_id`] without compiling a pattern: some
/// `](id)` must have a `[` after the last `]` that precedes it.
pub fn contains_markup_for(text: &str, id: &str) -> bool {
    let closing = format!("]({})", id);
    text.match_indices(&closing).any(|(at, _)| {
        let head = &text[..at];
        let open_from = head.rfind(']').map_or(0, |i| i + 1);
        head[open_from..].contains('[')
    })
}

/// One markup occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupMatch<'t> {
    /// Byte offset of the opening `[`
    pub start: usize,
    /// Byte offset after the closing `)`
    pub end: usize,
    /// The whole markup
    pub source: &'t str,
    /// Mention text between the brackets
    pub text: &'t str,
    /// Annotation id between the parentheses
    pub id: &'t str,
}

/// Compiled markup matcher
#[derive(Debug, Clone)]
pub struct MarkupPattern {
    regex: Regex,
}

impl MarkupPattern {
    /// Build a matcher whose ids match `id_pattern`
    pub fn new(id_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(&markup_regex(id_pattern))?,
        })
    }

    /// Matcher accepting any id
    pub fn any() -> &'static MarkupPattern {
        &ANY_MARKUP
    }

    /// Matcher for one literal id
    pub fn for_id(id: &str) -> Result<Self, regex::Error> {
        Self::new(&regex::escape(id))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// All non-overlapping occurrences, leftmost first
    pub fn matches<'t>(&self, text: &'t str) -> Vec<MarkupMatch<'t>> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(MarkupMatch {
                    start: whole.start(),
                    end: whole.end(),
                    source: whole.as_str(),
                    text: caps.name("text")?.as_str(),
                    id: caps.name("id")?.as_str(),
                })
            })
            .collect()
    }
}

impl Default for MarkupPattern {
    fn default() -> Self {
        Self::any().clone()
    }
}
