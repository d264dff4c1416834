//! Mention overlap predicates
//!
//! Two predicates with different boundary policies are used:
//!
//! - [`overlaps`] guards user-driven adds. Touching ranges
//!   (`a.end == b.start`) are accepted; sharing a character is not.
//! - [`touches`] guards merging of fetched annotations. It also rejects
//!   touching ranges.

use super::types::{Annotation, Mention};
use crate::buffer::Span;

/// Add-path guard: `!(a.end - 1 < b.start || b.end - 1 < a.start)`
pub fn overlaps(a: Span, b: Span) -> bool {
    // `x - 1 < y` rewritten as `x <= y` for unsigned offsets
    !(a.end <= b.start || b.end <= a.start)
}

/// Merge guard: `!(a.end < b.start || b.end < a.start)`
pub fn touches(a: Span, b: Span) -> bool {
    !(a.end < b.start || b.end < a.start)
}

/// First mention (store order) that overlaps `candidate`
pub fn find_conflict<'a>(
    candidate: Span,
    annotations: &'a [Annotation],
) -> Option<(&'a Annotation, &'a Mention)> {
    annotations.iter().find_map(|annotation| {
        annotation
            .mentions
            .iter()
            .find(|mention| !mention.is_vacant() && overlaps(candidate, mention.span()))
            .map(|mention| (annotation, mention))
    })
}
