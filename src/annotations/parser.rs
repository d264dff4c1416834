//! Annotation parser
//!
//! Splits a decorated description into plain text plus annotations whose
//! mentions are bound to enabled patches of a fresh description buffer.
//!
//! Two passes over a buffer are used:
//! 1. Over the decorated text, each markup span is patched down to its
//!    mention text. Rendering that buffer yields the plain text and where
//!    every mention landed in it.
//! 2. Over the plain text, each landed mention is patched back up to its
//!    markup. This second buffer is the live description buffer, so
//!    enabling a patch restores the decorated form.

use std::collections::HashMap;

use super::markup::MarkupPattern;
use super::types::{Annotation, Mention};
use crate::buffer::{PatchId, TextBuffer};
use crate::error::Result;

/// Output of [`parse_description`]
#[derive(Debug, Clone)]
pub struct ParsedDescription {
    /// Description with all markup removed
    pub plain_text: String,
    /// Buffer rooted at `plain_text`; rendering it gives back the input
    pub buffer: TextBuffer,
    /// One annotation per distinct id, in order of first appearance
    pub annotations: Vec<Annotation>,
}

/// Parse a decorated description
pub fn parse_description(description: &str, pattern: &MarkupPattern) -> Result<ParsedDescription> {
    let matches = pattern.matches(description);

    let mut reverse = TextBuffer::new(description);
    let mut reverse_ids = Vec::with_capacity(matches.len());
    for found in &matches {
        let id = reverse.create_patch(found.start, found.end, found.text)?;
        reverse.enable(id)?;
        reverse_ids.push(id);
    }

    let projection = reverse.render_projected();
    let landed: HashMap<PatchId, (usize, usize)> = projection
        .patches
        .iter()
        .map(|p| (p.patch, (p.start, p.end)))
        .collect();

    let mut buffer = TextBuffer::new(projection.text.as_str());
    let mut annotations: Vec<Annotation> = Vec::new();
    let mut by_id: HashMap<&str, usize> = HashMap::new();

    for (found, reverse_id) in matches.iter().zip(&reverse_ids) {
        let Some(&(start, end)) = landed.get(reverse_id) else {
            continue;
        };

        let patch = buffer.create_patch(start, end, found.source)?;
        buffer.enable(patch)?;

        let mention = Mention {
            start,
            end,
            text: found.text.to_string(),
            patch: Some(patch),
        };

        match by_id.get(found.id) {
            Some(&index) => annotations[index].mentions.push(mention),
            None => {
                by_id.insert(found.id, annotations.len());
                annotations.push(Annotation {
                    id: found.id.to_string(),
                    label: found.text.to_string(),
                    mentions: vec![mention],
                });
            }
        }
    }

    tracing::debug!(
        "Parsed description: {} annotations from {} markup spans",
        annotations.len(),
        matches.len()
    );

    Ok(ParsedDescription {
        plain_text: projection.text,
        buffer,
        annotations,
    })
}
