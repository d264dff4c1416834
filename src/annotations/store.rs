//! Annotation store
//!
//! The canonical set of text annotations for one description, together with
//! the description buffer their mentions are patched into.
//!
//! Activation is never stored. An annotation is active when the document's
//! rich description contains its markup, and [`AnnotationStore::set_active`]
//! is the only place patches are toggled and the document is re-rendered.

use std::collections::HashSet;

use super::markup::{contains_markup_for, format_markup, MarkupPattern};
use super::overlap;
use super::parser::{parse_description, ParsedDescription};
use super::types::{Annotation, AnnotationChanges, Mention};
use crate::buffer::{BufferError, PatchId, Span, TextBuffer};
use crate::error::{AnnotationError, Result};
use crate::record::DescriptionDocument;
use crate::text::TrailingTrimmer;

/// Whether to strip the trailing run offered by [`PendingMention`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingChoice {
    #[default]
    Keep,
    Strip,
}

/// A validated user selection waiting for the trailing-trim decision.
///
/// Only [`AnnotationStore::prepare_mention`] builds one, so the trailing run
/// always lies inside the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMention {
    annotation_id: String,
    start: usize,
    end: usize,
    text: String,
    /// Bytes [`TrailingChoice::Strip`] removes from the end, 0 when no trim is offered
    trailing: usize,
}

impl PendingMention {
    pub fn annotation_id(&self) -> &str {
        &self.annotation_id
    }

    /// Selected range, before any trim
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Selected text, before any trim
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte length of the trailing run offered for stripping
    pub fn trailing(&self) -> usize {
        self.trailing
    }

    pub fn offers_trim(&self) -> bool {
        self.trailing > 0
    }

    /// Range and text the mention gets under `choice`
    pub fn resolve(&self, choice: TrailingChoice) -> (Span, &str) {
        match choice {
            TrailingChoice::Keep => (Span::new(self.start, self.end), &self.text),
            TrailingChoice::Strip => {
                let end = self.end - self.trailing;
                (
                    Span::new(self.start, end),
                    &self.text[..self.text.len() - self.trailing],
                )
            }
        }
    }
}

/// Annotations of one description and the buffer they are patched into
#[derive(Debug, Clone)]
pub struct AnnotationStore {
    pub(crate) buffer: TextBuffer,
    pub(crate) annotations: Vec<Annotation>,
}

impl AnnotationStore {
    /// Empty store over a plain description
    pub fn new(plain_text: impl Into<String>) -> Self {
        Self {
            buffer: TextBuffer::new(plain_text),
            annotations: Vec::new(),
        }
    }

    /// Parse a decorated description into a seeded store
    pub fn parse(description: &str, pattern: &MarkupPattern) -> Result<Self> {
        Ok(Self::from_parsed(parse_description(description, pattern)?))
    }

    pub fn from_parsed(parsed: ParsedDescription) -> Self {
        Self {
            buffer: parsed.buffer,
            annotations: parsed.annotations,
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn plain_text(&self) -> &str {
        self.buffer.original_text()
    }

    /// Description with every enabled patch applied
    pub fn render(&self) -> String {
        self.buffer.render()
    }

    pub fn get_annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.annotations.iter().position(|a| a.id == id)
    }

    /// First mention in store order that overlaps `span`
    pub fn find_conflict(&self, span: Span) -> Option<(&Annotation, &Mention)> {
        overlap::find_conflict(span, &self.annotations)
    }

    /// Append an annotation. Mentions without a patch get a disabled one.
    pub fn add_annotation(&mut self, mut annotation: Annotation) -> Result<()> {
        if self.position(&annotation.id).is_some() {
            return Err(AnnotationError::DuplicateId(annotation.id));
        }

        let mut accepted: Vec<Span> = Vec::new();
        for mention in &annotation.mentions {
            match mention.patch {
                Some(patch) => {
                    self.buffer.range(patch)?;
                }
                None => {
                    let span = mention.span();
                    self.check_range(span)?;
                    self.check_conflict(span, &annotation.id, &accepted)?;
                    accepted.push(span);
                }
            }
        }

        for mention in &mut annotation.mentions {
            if mention.patch.is_none() {
                let markup = format_markup(&mention.text, &annotation.id);
                mention.patch = Some(self.buffer.create_patch(mention.start, mention.end, markup)?);
            }
        }

        tracing::debug!(
            "Added annotation {} with {} mentions",
            annotation.id,
            annotation.mentions.len()
        );
        self.annotations.push(annotation);
        Ok(())
    }

    /// Remove an annotation, taking it out of the document first.
    /// Returns `Ok(None)` if there is no such annotation.
    pub fn remove_annotation<D: DescriptionDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        id: &str,
    ) -> Result<Option<Annotation>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        if self.is_active(doc, id) {
            self.set_active(doc, id, false)?;
        }

        let annotation = self.annotations.remove(index);
        for patch in annotation.mentions.iter().filter_map(|m| m.patch) {
            self.buffer.discard(patch)?;
        }

        tracing::debug!("Removed annotation {}", id);
        Ok(Some(annotation))
    }

    /// Apply field changes to an annotation.
    ///
    /// An active annotation is deactivated, changed and reactivated under
    /// its new id, so the document never shows a half-edited annotation.
    /// In a new mention list, mentions carrying a patch handle must be
    /// mentions of this annotation and stay at their patch's range; the
    /// others are validated and get new patches.
    pub fn edit_annotation<D: DescriptionDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        id: &str,
        changes: AnnotationChanges,
    ) -> Result<()> {
        let index = self
            .position(id)
            .ok_or_else(|| AnnotationError::NotFound(id.to_string()))?;

        if let Some(new_id) = &changes.id {
            if new_id != id && self.position(new_id).is_some() {
                return Err(AnnotationError::DuplicateId(new_id.clone()));
            }
        }

        if let Some(mentions) = &changes.mentions {
            self.check_replacement_mentions(index, mentions)?;
        }

        let was_active = self.is_active(doc, id);
        if was_active {
            self.set_active(doc, id, false)?;
        }

        let annotation = &mut self.annotations[index];
        if let Some(label) = changes.label {
            annotation.label = label;
        }
        if let Some(new_id) = changes.id {
            annotation.id = new_id;
        }
        if let Some(mut mentions) = changes.mentions {
            let kept: HashSet<PatchId> = mentions.iter().filter_map(|m| m.patch).collect();
            for patch in annotation.mentions.iter().filter_map(|m| m.patch) {
                if !kept.contains(&patch) {
                    self.buffer.discard(patch)?;
                }
            }
            for mention in &mut mentions {
                if let Some(patch) = mention.patch {
                    let span = self.buffer.range(patch)?;
                    mention.start = span.start;
                    mention.end = span.end;
                }
            }
            annotation.mentions = mentions;
        }

        for mention in &mut annotation.mentions {
            let markup = format_markup(&mention.text, &annotation.id);
            match mention.patch {
                Some(patch) => self.buffer.set_replacement(patch, markup)?,
                None => {
                    mention.patch =
                        Some(self.buffer.create_patch(mention.start, mention.end, markup)?)
                }
            }
        }

        let current_id = annotation.id.clone();
        tracing::debug!("Edited annotation {} (now {})", id, current_id);

        if was_active {
            self.set_active(doc, &current_id, true)?;
        }
        Ok(())
    }

    /// Whether the document's rich description contains markup for `id`
    pub fn is_active<D: DescriptionDocument + ?Sized>(&self, doc: &D, id: &str) -> bool {
        doc.rich_description()
            .map(|rich| contains_markup_for(rich, id))
            .unwrap_or(false)
    }

    /// Enable or disable every mention patch of `id` and commit the
    /// re-rendered description to the document
    pub fn set_active<D: DescriptionDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        id: &str,
        active: bool,
    ) -> Result<()> {
        let annotation = self
            .get_annotation(id)
            .ok_or_else(|| AnnotationError::NotFound(id.to_string()))?;

        let patches: Vec<PatchId> = annotation.mentions.iter().filter_map(|m| m.patch).collect();
        for &patch in &patches {
            self.buffer.range(patch)?;
        }
        for &patch in &patches {
            if active {
                self.buffer.enable(patch)?;
            } else {
                self.buffer.disable(patch)?;
            }
        }

        self.commit(doc);
        tracing::debug!("Annotation {} active: {}", id, active);
        Ok(())
    }

    /// Validate a user selection for a new mention of `id`
    pub fn prepare_mention(
        &self,
        id: &str,
        selection: Span,
        trimmer: &TrailingTrimmer,
    ) -> Result<PendingMention> {
        if self.position(id).is_none() {
            return Err(AnnotationError::NotFound(id.to_string()));
        }
        if selection.is_empty() {
            return Err(AnnotationError::InvalidRange {
                start: selection.start,
                end: selection.end,
                reason: "empty selection".to_string(),
            });
        }
        self.check_range(selection)?;
        self.check_conflict(selection, id, &[])?;

        let text = &self.plain_text()[selection.start..selection.end];
        let trailing = match trimmer.trailing_len(text) {
            len if len == text.len() => 0,
            len => len,
        };

        Ok(PendingMention {
            annotation_id: id.to_string(),
            start: selection.start,
            end: selection.end,
            text: text.to_string(),
            trailing,
        })
    }

    /// Attach a prepared mention and activate its annotation
    pub fn commit_mention<D: DescriptionDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        pending: &PendingMention,
        choice: TrailingChoice,
    ) -> Result<Mention> {
        let id = pending.annotation_id();
        let index = self
            .position(id)
            .ok_or_else(|| AnnotationError::NotFound(id.to_string()))?;

        let (span, text) = pending.resolve(choice);
        self.check_range(span)?;
        if &self.plain_text()[span.start..span.end] != text {
            return Err(AnnotationError::InvalidRange {
                start: span.start,
                end: span.end,
                reason: "selection no longer matches the description".to_string(),
            });
        }
        self.check_conflict(span, id, &[])?;

        let patch = self
            .buffer
            .create_patch(span.start, span.end, format_markup(text, id))?;
        let mention = Mention {
            start: span.start,
            end: span.end,
            text: text.to_string(),
            patch: Some(patch),
        };
        self.annotations[index].mentions.push(mention.clone());

        self.set_active(doc, id, true)?;
        Ok(mention)
    }

    /// Prepare and commit a mention in one step
    pub fn add_mention<D: DescriptionDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        id: &str,
        selection: Span,
        trimmer: &TrailingTrimmer,
        choice: TrailingChoice,
    ) -> Result<Mention> {
        let pending = self.prepare_mention(id, selection, trimmer)?;
        self.commit_mention(doc, &pending, choice)
    }

    /// Write the rendered and base text into the document
    pub(crate) fn commit<D: DescriptionDocument + ?Sized>(&self, doc: &mut D) {
        doc.set_rich_description(self.buffer.render());
        doc.set_description(self.buffer.original_text().to_string());
    }

    fn check_range(&self, span: Span) -> Result<()> {
        self.buffer
            .check_range(span.start, span.end)
            .map_err(|e| invalid_range(span, e))
    }

    fn check_conflict(&self, span: Span, id: &str, pending: &[Span]) -> Result<()> {
        if let Some((annotation, mention)) = self.find_conflict(span) {
            return Err(AnnotationError::OverlapConflict {
                annotation_id: annotation.id.clone(),
                start: mention.start,
                end: mention.end,
            });
        }
        if let Some(other) = pending.iter().find(|other| overlap::overlaps(span, **other)) {
            return Err(AnnotationError::OverlapConflict {
                annotation_id: id.to_string(),
                start: other.start,
                end: other.end,
            });
        }
        Ok(())
    }

    /// Validate a replacement mention list for the annotation at `index`
    fn check_replacement_mentions(&self, index: usize, mentions: &[Mention]) -> Result<()> {
        let annotation = &self.annotations[index];
        let owned: HashSet<PatchId> = annotation.mentions.iter().filter_map(|m| m.patch).collect();

        let mut accepted: Vec<Span> = Vec::new();
        for mention in mentions {
            if let Some(patch) = mention.patch {
                if !owned.contains(&patch) {
                    return Err(BufferError::UnknownPatch(patch).into());
                }
                accepted.push(self.buffer.range(patch)?);
            }
        }

        for mention in mentions.iter().filter(|m| m.patch.is_none()) {
            let span = mention.span();
            self.check_range(span)?;

            let others = self
                .annotations
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .flat_map(|(_, a)| a.mentions.iter().map(move |m| (a, m)));
            for (other, existing) in others {
                if !existing.is_vacant() && overlap::overlaps(span, existing.span()) {
                    return Err(AnnotationError::OverlapConflict {
                        annotation_id: other.id.clone(),
                        start: existing.start,
                        end: existing.end,
                    });
                }
            }
            if let Some(other) = accepted.iter().find(|other| overlap::overlaps(span, **other)) {
                return Err(AnnotationError::OverlapConflict {
                    annotation_id: annotation.id.clone(),
                    start: other.start,
                    end: other.end,
                });
            }
            accepted.push(span);
        }
        Ok(())
    }
}

fn invalid_range(span: Span, err: BufferError) -> AnnotationError {
    AnnotationError::InvalidRange {
        start: span.start,
        end: span.end,
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SequenceRecord;

    const TERM: &str = "https://x/term1";

    fn open(description: &str) -> (SequenceRecord, AnnotationStore) {
        let mut record = SequenceRecord::new("https://x/parts/p1").with_description(description);
        record.ensure_rich_description();
        let rich = record.rich_description().unwrap_or_default().to_string();
        let store = AnnotationStore::parse(&rich, MarkupPattern::any()).unwrap();
        store.commit(&mut record);
        (record, store)
    }

    #[test]
    fn test_tetr_scenario() {
        let (mut record, mut store) = open("TetR is a repressor.");
        assert_eq!(store.plain_text(), "TetR is a repressor.");
        assert!(store.annotations().is_empty());

        store.add_annotation(Annotation::new(TERM, "TetR")).unwrap();
        let pending = store
            .prepare_mention(TERM, Span::new(0, 5), TrailingTrimmer::standard())
            .unwrap();
        assert!(pending.offers_trim());
        assert_eq!(pending.text(), "TetR ");

        let mention = store.commit_mention(&mut record, &pending, TrailingChoice::Strip).unwrap();

        assert_eq!((mention.start, mention.end), (0, 4));
        assert_eq!(mention.text, "TetR");
        assert_eq!(
            record.rich_description(),
            Some("[TetR](https://x/term1) is a repressor.")
        );
        assert_eq!(record.description(), Some("TetR is a repressor."));
        assert!(store.is_active(&record, TERM));
    }

    #[test]
    fn test_pending_mention_resolves_within_selection() {
        let (_, mut store) = open("TetR, a repressor.");
        store.add_annotation(Annotation::new(TERM, "TetR")).unwrap();

        let pending = store
            .prepare_mention(TERM, Span::new(0, 6), TrailingTrimmer::standard())
            .unwrap();
        assert_eq!(pending.annotation_id(), TERM);
        assert_eq!(pending.span(), Span::new(0, 6));
        assert_eq!(pending.trailing(), 2);

        assert_eq!(pending.resolve(TrailingChoice::Keep), (Span::new(0, 6), "TetR, "));
        assert_eq!(pending.resolve(TrailingChoice::Strip), (Span::new(0, 4), "TetR"));
    }

    #[test]
    fn test_keep_choice_keeps_trailing_text() {
        let (mut record, mut store) = open("TetR is a repressor.");
        store.add_annotation(Annotation::new(TERM, "TetR")).unwrap();

        store
            .add_mention(
                &mut record,
                TERM,
                Span::new(0, 5),
                TrailingTrimmer::standard(),
                TrailingChoice::Keep,
            )
            .unwrap();

        assert_eq!(
            record.rich_description(),
            Some("[TetR ](https://x/term1)is a repressor.")
        );
    }

    #[test]
    fn test_add_mention_boundary() {
        let (mut record, mut store) = open("TetR binds tetO DNA");
        store.add_annotation(Annotation::new("https://x/a", "a")).unwrap();
        store.add_annotation(Annotation::new("https://x/b", "b")).unwrap();
        let trimmer = TrailingTrimmer::standard();

        store
            .add_mention(&mut record, "https://x/a", Span::new(11, 15), trimmer, TrailingChoice::Keep)
            .unwrap();

        // ends exactly where the existing mention starts
        store
            .add_mention(&mut record, "https://x/b", Span::new(5, 11), trimmer, TrailingChoice::Keep)
            .unwrap();

        // shares one character with the existing mention
        let err = store
            .prepare_mention("https://x/b", Span::new(14, 19), trimmer)
            .unwrap_err();
        assert_eq!(err.conflicting_annotation(), Some("https://x/a"));
    }

    #[test]
    fn test_conflict_does_not_mutate() {
        let (mut record, mut store) = open("TetR binds tetO");
        store.add_annotation(Annotation::new("https://x/a", "a")).unwrap();
        store
            .add_mention(
                &mut record,
                "https://x/a",
                Span::new(0, 4),
                TrailingTrimmer::standard(),
                TrailingChoice::Keep,
            )
            .unwrap();
        let rich_before = record.rich_description().map(str::to_string);
        let patches_before = store.buffer().patch_count();

        let result = store.add_mention(
            &mut record,
            "https://x/a",
            Span::new(2, 8),
            TrailingTrimmer::standard(),
            TrailingChoice::Keep,
        );

        assert!(matches!(result, Err(AnnotationError::OverlapConflict { .. })));
        assert_eq!(record.rich_description().map(str::to_string), rich_before);
        assert_eq!(store.buffer().patch_count(), patches_before);
        assert_eq!(store.get_annotation("https://x/a").unwrap().mentions.len(), 1);
    }

    #[test]
    fn test_prepare_mention_rejections() {
        let (_, mut store) = open("héllo world");
        store.add_annotation(Annotation::new(TERM, "x")).unwrap();
        let trimmer = TrailingTrimmer::standard();

        assert!(matches!(
            store.prepare_mention("https://x/missing", Span::new(0, 2), trimmer),
            Err(AnnotationError::NotFound(_))
        ));
        assert!(matches!(
            store.prepare_mention(TERM, Span::new(3, 3), trimmer),
            Err(AnnotationError::InvalidRange { .. })
        ));
        assert!(matches!(
            store.prepare_mention(TERM, Span::new(0, 2), trimmer),
            Err(AnnotationError::InvalidRange { .. })
        ));
        assert!(matches!(
            store.prepare_mention(TERM, Span::new(0, 99), trimmer),
            Err(AnnotationError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_trim_not_offered_for_all_punctuation() {
        let (_, mut store) = open("a, b");
        store.add_annotation(Annotation::new(TERM, "x")).unwrap();

        let pending = store
            .prepare_mention(TERM, Span::new(1, 3), TrailingTrimmer::standard())
            .unwrap();
        assert!(!pending.offers_trim());
    }

    #[test]
    fn test_toggle_symmetry() {
        let (mut record, mut store) =
            open("[TetR](https://x/tetr) binds [tetO](https://x/teto).");
        let before = record.rich_description().map(str::to_string);

        store.set_active(&mut record, "https://x/tetr", false).unwrap();
        assert_eq!(
            record.rich_description(),
            Some("TetR binds [tetO](https://x/teto).")
        );
        assert!(!store.is_active(&record, "https://x/tetr"));
        assert!(store.is_active(&record, "https://x/teto"));

        store.set_active(&mut record, "https://x/tetr", true).unwrap();
        assert_eq!(record.rich_description().map(str::to_string), before);

        let deactivated = {
            store.set_active(&mut record, "https://x/teto", false).unwrap();
            record.rich_description().map(str::to_string)
        };
        store.set_active(&mut record, "https://x/teto", true).unwrap();
        store.set_active(&mut record, "https://x/teto", false).unwrap();
        assert_eq!(record.rich_description().map(str::to_string), deactivated);
    }

    #[test]
    fn test_set_active_unknown() {
        let (mut record, mut store) = open("text");
        assert!(matches!(
            store.set_active(&mut record, "https://x/none", true),
            Err(AnnotationError::NotFound(_))
        ));
    }

    #[test]
    fn test_add_annotation_duplicate_and_conflict() {
        let (_, mut store) = open("TetR binds tetO");
        store
            .add_annotation(
                Annotation::new("https://x/a", "TetR").with_mentions(vec![Mention::new(0, 4, "TetR")]),
            )
            .unwrap();

        assert!(matches!(
            store.add_annotation(Annotation::new("https://x/a", "again")),
            Err(AnnotationError::DuplicateId(_))
        ));

        let overlapping =
            Annotation::new("https://x/b", "b").with_mentions(vec![Mention::new(3, 6, "R b")]);
        let err = store.add_annotation(overlapping).unwrap_err();
        assert_eq!(err.conflicting_annotation(), Some("https://x/a"));
        assert!(store.get_annotation("https://x/b").is_none());
        assert_eq!(store.buffer().patch_count(), 1);
    }

    #[test]
    fn test_add_annotation_patches_start_disabled() {
        let (record, mut store) = open("TetR binds tetO");
        store
            .add_annotation(
                Annotation::new("https://x/a", "TetR").with_mentions(vec![Mention::new(0, 4, "TetR")]),
            )
            .unwrap();

        let patch = store.get_annotation("https://x/a").unwrap().mentions[0].patch.unwrap();
        assert!(!store.buffer().is_enabled(patch).unwrap());
        assert_eq!(store.buffer().replacement(patch).unwrap(), "[TetR](https://x/a)");
        assert!(!store.is_active(&record, "https://x/a"));
    }

    #[test]
    fn test_remove_annotation() {
        let (mut record, mut store) =
            open("[TetR](https://x/tetr) binds [tetO](https://x/teto).");

        let removed = store.remove_annotation(&mut record, "https://x/tetr").unwrap();
        assert_eq!(removed.unwrap().label, "TetR");
        assert_eq!(
            record.rich_description(),
            Some("TetR binds [tetO](https://x/teto).")
        );
        assert_eq!(store.buffer().patch_count(), 1);

        assert!(store.remove_annotation(&mut record, "https://x/tetr").unwrap().is_none());
    }

    #[test]
    fn test_edit_active_annotation_changes_id() {
        let (mut record, mut store) =
            open("[TetR](https://x/old) binds [tetO](https://x/teto) and [TetR](https://x/old).");

        store
            .edit_annotation(
                &mut record,
                "https://x/old",
                AnnotationChanges::default().id("https://x/new").label("TetR protein"),
            )
            .unwrap();

        assert_eq!(
            record.rich_description(),
            Some("[TetR](https://x/new) binds [tetO](https://x/teto) and [TetR](https://x/new).")
        );
        assert!(store.get_annotation("https://x/old").is_none());
        let edited = store.get_annotation("https://x/new").unwrap();
        assert_eq!(edited.label, "TetR protein");
        assert_eq!(edited.display_id(), "new");
        assert!(store.is_active(&record, "https://x/new"));
        assert!(!store.is_active(&record, "https://x/old"));
    }

    #[test]
    fn test_edit_inactive_annotation_stays_inactive() {
        let (mut record, mut store) = open("TetR binds tetO");
        store
            .add_annotation(
                Annotation::new("https://x/a", "TetR").with_mentions(vec![Mention::new(0, 4, "TetR")]),
            )
            .unwrap();

        store
            .edit_annotation(&mut record, "https://x/a", AnnotationChanges::default().id("https://x/b"))
            .unwrap();

        assert_eq!(record.rich_description(), Some("TetR binds tetO"));
        let patch = store.get_annotation("https://x/b").unwrap().mentions[0].patch.unwrap();
        assert_eq!(store.buffer().replacement(patch).unwrap(), "[TetR](https://x/b)");
    }

    #[test]
    fn test_edit_mentions_replaces_patches() {
        let (mut record, mut store) = open("[TetR](https://x/a) binds tetO");
        let kept = store.get_annotation("https://x/a").unwrap().mentions.clone();

        store
            .edit_annotation(
                &mut record,
                "https://x/a",
                AnnotationChanges::default().mentions(vec![Mention::new(11, 15, "tetO")]),
            )
            .unwrap();
        assert_eq!(record.rich_description(), Some("TetR binds [tetO](https://x/a)"));
        assert!(store.buffer().range(kept[0].patch.unwrap()).is_err());

        let mut both = store.get_annotation("https://x/a").unwrap().mentions.clone();
        both.push(Mention::new(0, 4, "TetR"));
        store
            .edit_annotation(&mut record, "https://x/a", AnnotationChanges::default().mentions(both))
            .unwrap();
        assert_eq!(
            record.rich_description(),
            Some("[TetR](https://x/a) binds [tetO](https://x/a)")
        );
    }

    #[test]
    fn test_edit_rejections_leave_state() {
        let (mut record, mut store) =
            open("[TetR](https://x/a) binds [tetO](https://x/b)");
        let before = record.rich_description().map(str::to_string);

        assert!(matches!(
            store.edit_annotation(&mut record, "https://x/none", AnnotationChanges::default()),
            Err(AnnotationError::NotFound(_))
        ));
        assert!(matches!(
            store.edit_annotation(&mut record, "https://x/a", AnnotationChanges::default().id("https://x/b")),
            Err(AnnotationError::DuplicateId(_))
        ));

        let mut mentions = store.get_annotation("https://x/a").unwrap().mentions.clone();
        mentions.push(Mention::new(12, 15, "etO"));
        let err = store
            .edit_annotation(&mut record, "https://x/a", AnnotationChanges::default().mentions(mentions))
            .unwrap_err();
        assert_eq!(err.conflicting_annotation(), Some("https://x/b"));

        assert_eq!(record.rich_description().map(str::to_string), before);
        assert!(store.is_active(&record, "https://x/a"));
    }
}
