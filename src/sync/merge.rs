//! Merging fetched annotations
//!
//! Best-effort: fetched mentions that touch an existing mention or fall
//! outside the description are dropped, never reported as errors. New
//! mentions get disabled patches, so merged annotations start inactive.

use crate::annotations::{format_markup, touches, Annotation, AnnotationStore, Mention};
use crate::error::Result;
use crate::extract::ExtractedAnnotation;

use super::types::MergeReport;

/// Merge a fetched batch into the store
pub fn merge_extracted(
    store: &mut AnnotationStore,
    batch: Vec<ExtractedAnnotation>,
) -> Result<MergeReport> {
    let mut buffer = store.buffer.clone();
    let mut working = store.annotations.clone();
    let mut report = MergeReport::default();
    let fetched_count = batch.len();

    for fetched in batch {
        let fetched = fetched.into_annotation();

        let index = match working.iter().position(|a| a.id == fetched.id) {
            Some(index) => index,
            None => {
                working.push(Annotation::new(fetched.id.clone(), fetched.label.clone()));
                report.annotations_added += 1;
                working.len() - 1
            }
        };

        for mention in fetched.mentions {
            if let Err(e) = buffer.check_range(mention.start, mention.end) {
                tracing::warn!(
                    "Dropping fetched mention {}..{} of {}: {}",
                    mention.start,
                    mention.end,
                    fetched.id,
                    e
                );
                report.mentions_dropped += 1;
                continue;
            }

            if touches_any(&working, &mention) {
                report.mentions_dropped += 1;
                continue;
            }

            working[index].mentions.push(mention);
            report.mentions_added += 1;
        }
    }

    for annotation in &mut working {
        for mention in &mut annotation.mentions {
            if mention.patch.is_none() {
                let markup = format_markup(&mention.text, &annotation.id);
                mention.patch = Some(buffer.create_patch(mention.start, mention.end, markup)?);
            }
        }
    }

    store.buffer = buffer;
    store.annotations = working;

    tracing::info!(
        "Merged {} fetched annotations: {} new, {} mentions added, {} dropped",
        fetched_count,
        report.annotations_added,
        report.mentions_added,
        report.mentions_dropped
    );

    Ok(report)
}

fn touches_any(annotations: &[Annotation], candidate: &Mention) -> bool {
    annotations
        .iter()
        .flat_map(|a| a.mentions.iter())
        .filter(|existing| !existing.is_vacant())
        .any(|existing| touches(existing.span(), candidate.span()))
}
