//! Description edits
//!
//! Replaces the plain description and carries every mention with it. The
//! work happens on copies of the buffer and annotations; the store and the
//! document are only touched once everything has been repositioned.

use crate::annotations::{format_markup, AnnotationStore};
use crate::error::Result;
use crate::record::DescriptionDocument;

use super::types::EditReport;

/// Adopt `new_text` as the plain description
pub fn apply_description_edit<D: DescriptionDocument + ?Sized>(
    store: &mut AnnotationStore,
    doc: &mut D,
    new_text: &str,
) -> Result<EditReport> {
    let mut buffer = store.buffer.clone();
    let mut annotations = store.annotations.clone();

    let rebase = buffer.rebase(new_text);
    let mut report = EditReport {
        revision: buffer.revision(),
        ..Default::default()
    };

    for annotation in &mut annotations {
        for mention in &mut annotation.mentions {
            let Some(patch) = mention.patch else { continue };

            let span = buffer.range(patch)?;

            // Orphans collapse to the deletion point and keep their last text
            if buffer.is_orphaned(patch)? {
                if rebase.orphaned.contains(&patch) {
                    report.orphaned.push(annotation.id.clone());
                }
                mention.start = span.start;
                mention.end = span.end;
                continue;
            }

            buffer.check_range(span.start, span.end)?;
            if span.start != mention.start || span.end != mention.end {
                report.moved += 1;
            }

            mention.start = span.start;
            mention.end = span.end;
            mention.text = new_text[span.start..span.end].to_string();
            buffer.set_replacement(patch, format_markup(&mention.text, &annotation.id))?;
        }
    }

    store.buffer = buffer;
    store.annotations = annotations;
    store.commit(doc);

    tracing::debug!(
        "Description edited: {} mentions moved, {} orphaned",
        report.moved,
        report.orphaned.len()
    );

    Ok(report)
}
