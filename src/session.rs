//! Editing session
//!
//! Explicit context for one loaded record:
//! - The record and its document identity
//! - The text annotation store and the sequence annotation store
//! - A change log the consumer drains to learn what to refresh
//!
//! Fetches are split into ticket, fetch and apply so user edits may run
//! while a request is in flight. Results for a replaced document or an
//! edited description are discarded on apply.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::annotations::{
    Annotation, AnnotationChanges, AnnotationStore, MarkupPattern, Mention, PendingMention,
    TrailingChoice,
};
use crate::buffer::Span;
use crate::config::AnnotationConfig;
use crate::error::Result;
use crate::extract::{ExtractedAnnotation, ExtractionProvider, SequenceFeature};
use crate::record::{
    DescriptionDocument, SequenceAnnotationStore, SequenceFeatureChanges, SequenceRecord,
};
use crate::sync::{apply_description_edit, merge_extracted, EditReport, FetchTicket, MergeOutcome, MergeReport};
use crate::text::TrailingTrimmer;

/// What a session mutation changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Change {
    DocumentLoaded {
        #[serde(rename = "documentId")]
        document_id: Uuid,
    },
    Description,
    TextAnnotations,
    SequenceAnnotations,
    Properties,
}

/// One loaded record and its annotation stores
#[derive(Debug)]
pub struct Session {
    document_id: Uuid,
    opened_at: DateTime<Utc>,
    record: SequenceRecord,
    text: AnnotationStore,
    sequence: SequenceAnnotationStore,
    markup: MarkupPattern,
    trimmer: TrailingTrimmer,
    changes: Vec<Change>,
}

impl Session {
    /// Load a record with the given markup and trimming patterns
    pub fn open(record: SequenceRecord, markup: MarkupPattern, trimmer: TrailingTrimmer) -> Result<Self> {
        let (record, text, sequence) = load(record, &markup)?;
        let document_id = Uuid::new_v4();

        tracing::debug!("Opened {} as document {}", record.uri(), document_id);

        Ok(Self {
            document_id,
            opened_at: Utc::now(),
            record,
            text,
            sequence,
            markup,
            trimmer,
            changes: vec![Change::DocumentLoaded { document_id }],
        })
    }

    pub fn from_config(record: SequenceRecord, config: &AnnotationConfig) -> Result<Self> {
        Self::open(record, config.markup_pattern()?, config.trimmer()?)
    }

    /// Load another record in place under a new document identity
    pub fn replace_record(&mut self, record: SequenceRecord) -> Result<()> {
        let (record, text, sequence) = load(record, &self.markup)?;

        self.document_id = Uuid::new_v4();
        self.opened_at = Utc::now();
        self.record = record;
        self.text = text;
        self.sequence = sequence;
        self.changes.push(Change::DocumentLoaded {
            document_id: self.document_id,
        });

        tracing::debug!("Replaced record, now document {}", self.document_id);
        Ok(())
    }

    pub fn document_id(&self) -> Uuid {
        self.document_id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    pub fn record(&self) -> &SequenceRecord {
        &self.record
    }

    pub fn text_annotations(&self) -> &AnnotationStore {
        &self.text
    }

    pub fn sequence_annotations(&self) -> &SequenceAnnotationStore {
        &self.sequence
    }

    /// Take the changes recorded since the last call
    pub fn drain_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    // ========================================================================
    // Text annotations
    // ========================================================================

    /// Add an annotation with no mentions
    pub fn create_text_annotation(&mut self, id: impl Into<String>, label: impl Into<String>) -> Result<()> {
        self.add_text_annotation(Annotation::new(id, label))
    }

    pub fn add_text_annotation(&mut self, annotation: Annotation) -> Result<()> {
        self.text.add_annotation(annotation)?;
        self.changes.push(Change::TextAnnotations);
        Ok(())
    }

    pub fn remove_text_annotation(&mut self, id: &str) -> Result<Option<Annotation>> {
        let removed = self.text.remove_annotation(&mut self.record, id)?;
        if removed.is_some() {
            self.changes.push(Change::TextAnnotations);
        }
        Ok(removed)
    }

    pub fn edit_text_annotation(&mut self, id: &str, changes: AnnotationChanges) -> Result<()> {
        self.text.edit_annotation(&mut self.record, id, changes)?;
        self.changes.push(Change::TextAnnotations);
        Ok(())
    }

    pub fn is_text_active(&self, id: &str) -> bool {
        self.text.is_active(&self.record, id)
    }

    pub fn set_text_active(&mut self, id: &str, active: bool) -> Result<()> {
        self.text.set_active(&mut self.record, id, active)?;
        self.changes.push(Change::TextAnnotations);
        Ok(())
    }

    /// Activate every text annotation
    pub fn activate_all_text(&mut self) -> Result<()> {
        let ids: Vec<String> = self.text.annotations().iter().map(|a| a.id.clone()).collect();
        for id in &ids {
            self.text.set_active(&mut self.record, id, true)?;
        }
        self.changes.push(Change::TextAnnotations);
        Ok(())
    }

    /// Validate a user selection for a new mention of `id`
    pub fn prepare_mention(&self, id: &str, selection: Span) -> Result<PendingMention> {
        self.text.prepare_mention(id, selection, &self.trimmer)
    }

    pub fn commit_mention(&mut self, pending: &PendingMention, choice: TrailingChoice) -> Result<Mention> {
        let mention = self.text.commit_mention(&mut self.record, pending, choice)?;
        self.changes.push(Change::TextAnnotations);
        Ok(mention)
    }

    /// Replace the plain description
    pub fn edit_description(&mut self, new_text: &str) -> Result<EditReport> {
        let report = apply_description_edit(&mut self.text, &mut self.record, new_text)?;
        self.changes.push(Change::Description);
        Ok(report)
    }

    // ========================================================================
    // Sequence annotations
    // ========================================================================

    pub fn add_sequence_annotation(&mut self, feature: SequenceFeature) -> Result<()> {
        self.sequence.add(feature)?;
        self.changes.push(Change::SequenceAnnotations);
        Ok(())
    }

    pub fn remove_sequence_annotation(&mut self, id: &str) -> Option<SequenceFeature> {
        let removed = self.sequence.remove(&mut self.record, id);
        if removed.is_some() {
            self.changes.push(Change::SequenceAnnotations);
        }
        removed
    }

    pub fn edit_sequence_annotation(&mut self, id: &str, changes: SequenceFeatureChanges) -> Result<()> {
        self.sequence.edit(&mut self.record, id, changes)?;
        self.changes.push(Change::SequenceAnnotations);
        Ok(())
    }

    pub fn is_sequence_active(&self, id: &str) -> bool {
        self.sequence.is_active(&self.record, id)
    }

    pub fn set_sequence_active(&mut self, id: &str, active: bool) -> Result<()> {
        self.sequence.set_active(&mut self.record, id, active)?;
        self.changes.push(Change::SequenceAnnotations);
        Ok(())
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Ticket for fetching text annotations of the current description
    pub fn text_fetch_ticket(&self) -> FetchTicket {
        FetchTicket::new(
            self.document_id,
            self.text.buffer().revision(),
            self.text.plain_text(),
        )
    }

    /// Ticket for fetching sequence features of the current record
    pub fn sequence_fetch_ticket(&self) -> FetchTicket {
        let payload = self
            .record
            .source()
            .or(self.record.sequence())
            .unwrap_or_default();
        FetchTicket::new(self.document_id, self.text.buffer().revision(), payload)
    }

    /// Merge fetched text annotations unless the ticket is stale
    pub fn apply_text_annotations(
        &mut self,
        ticket: &FetchTicket,
        fetched: Vec<ExtractedAnnotation>,
    ) -> Result<MergeOutcome> {
        if ticket.document_id != self.document_id {
            tracing::debug!("Discarding text fetch {}: document replaced", ticket.request_id);
            return Ok(MergeOutcome::Stale);
        }
        if ticket.text_revision != self.text.buffer().revision() {
            tracing::debug!("Discarding text fetch {}: description edited", ticket.request_id);
            return Ok(MergeOutcome::Stale);
        }

        let report = merge_extracted(&mut self.text, fetched)?;
        self.changes.push(Change::TextAnnotations);
        Ok(MergeOutcome::Applied(report))
    }

    /// Merge fetched sequence features unless the document was replaced
    pub fn apply_sequence_annotations(
        &mut self,
        ticket: &FetchTicket,
        fetched: Vec<SequenceFeature>,
    ) -> MergeOutcome {
        if ticket.document_id != self.document_id {
            tracing::debug!("Discarding sequence fetch {}: document replaced", ticket.request_id);
            return MergeOutcome::Stale;
        }

        let added = self.sequence.merge(fetched);
        tracing::info!("Merged {} new sequence features", added);
        self.changes.push(Change::SequenceAnnotations);
        MergeOutcome::Applied(MergeReport {
            annotations_added: added,
            ..Default::default()
        })
    }

    pub async fn load_text_annotations(
        &mut self,
        provider: &dyn ExtractionProvider,
    ) -> Result<MergeOutcome> {
        let ticket = self.text_fetch_ticket();
        tracing::debug!("Fetching text annotations from {}", provider.name());
        let fetched = provider.fetch_text_annotations(&ticket.payload).await?;
        self.apply_text_annotations(&ticket, fetched)
    }

    pub async fn load_sequence_annotations(
        &mut self,
        provider: &dyn ExtractionProvider,
    ) -> Result<MergeOutcome> {
        let ticket = self.sequence_fetch_ticket();
        tracing::debug!("Fetching sequence annotations from {}", provider.name());
        let fetched = provider.fetch_sequence_annotations(&ticket.payload).await?;
        Ok(self.apply_sequence_annotations(&ticket, fetched))
    }

    // ========================================================================
    // Record properties
    // ========================================================================

    pub fn add_target_organism(&mut self, uri: &str) -> bool {
        let changed = self.record.add_target_organism(uri);
        self.note_properties(changed)
    }

    pub fn remove_target_organism(&mut self, uri: &str) -> bool {
        let changed = self.record.remove_target_organism(uri);
        self.note_properties(changed)
    }

    pub fn add_protein(&mut self, uri: &str) -> bool {
        let changed = self.record.add_protein(uri);
        self.note_properties(changed)
    }

    pub fn remove_protein(&mut self, uri: &str) -> bool {
        let changed = self.record.remove_protein(uri);
        self.note_properties(changed)
    }

    pub fn add_reference(&mut self, uri: &str) -> bool {
        let changed = self.record.add_reference(uri);
        self.note_properties(changed)
    }

    pub fn remove_reference(&mut self, uri: &str) -> bool {
        let changed = self.record.remove_reference(uri);
        self.note_properties(changed)
    }

    pub fn set_role(&mut self, role: &str) {
        self.record.set_role(role);
        self.changes.push(Change::Properties);
    }

    fn note_properties(&mut self, changed: bool) -> bool {
        if changed {
            self.changes.push(Change::Properties);
        }
        changed
    }
}

/// Seed the rich description, parse it and seed the sequence features
fn load(
    mut record: SequenceRecord,
    markup: &MarkupPattern,
) -> Result<(SequenceRecord, AnnotationStore, SequenceAnnotationStore)> {
    record.ensure_rich_description();
    let rich = record.rich_description().unwrap_or_default().to_string();

    let text = AnnotationStore::parse(&rich, markup)?;
    record.set_description(text.plain_text().to_string());
    let sequence = SequenceAnnotationStore::from_document(&record);

    Ok((record, text, sequence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnnotationError;
    use crate::extract::{ExtractedMention, MockProvider};
    use crate::record::FeatureDocument;

    fn record(rich: &str) -> SequenceRecord {
        let mut record = SequenceRecord::new("https://x/parts/BBa_C0040")
            .with_source("<sbol/>")
            .with_sequence("atgtccagattagataaaagtaaagtgattaacagc");
        record.set_rich_description(rich.to_string());
        record
    }

    fn open(rich: &str) -> Session {
        Session::open(record(rich), MarkupPattern::default(), TrailingTrimmer::default()).unwrap()
    }

    fn tetr_batch() -> Vec<ExtractedAnnotation> {
        vec![ExtractedAnnotation {
            id: "https://x/tetr".to_string(),
            label: Some("TetR".to_string()),
            mentions: vec![ExtractedMention {
                start: 0,
                end: 4,
                text: "TetR".to_string(),
            }],
        }]
    }

    #[test]
    fn test_open_sets_plain_description() {
        let mut session = open("[TetR](https://x/tetr) is a repressor.");

        assert_eq!(session.record().description(), Some("TetR is a repressor."));
        assert_eq!(session.text_annotations().annotations().len(), 1);
        assert!(session.is_text_active("https://x/tetr"));
        assert_eq!(
            session.drain_changes(),
            vec![Change::DocumentLoaded { document_id: session.document_id() }]
        );
        assert!(session.drain_changes().is_empty());
    }

    #[test]
    fn test_open_seeds_rich_from_plain() {
        let record = SequenceRecord::new("https://x/parts/p1").with_description("TetR is a repressor.");
        let session = Session::from_config(record, &AnnotationConfig::default()).unwrap();

        assert_eq!(session.record().rich_description(), Some("TetR is a repressor."));
        assert!(session.text_annotations().annotations().is_empty());
    }

    #[test]
    fn test_user_add_flow() {
        let mut session = open("TetR is a repressor.");
        session.drain_changes();

        session.create_text_annotation("https://x/term1", "TetR").unwrap();
        let pending = session.prepare_mention("https://x/term1", Span::new(0, 5)).unwrap();
        session.commit_mention(&pending, TrailingChoice::Strip).unwrap();

        assert_eq!(
            session.record().rich_description(),
            Some("[TetR](https://x/term1) is a repressor.")
        );
        assert_eq!(
            session.drain_changes(),
            vec![Change::TextAnnotations, Change::TextAnnotations]
        );
    }

    #[tokio::test]
    async fn test_load_text_annotations() {
        let mut session = open("TetR is a repressor.");
        let provider = MockProvider::with_text(tetr_batch());

        let outcome = session.load_text_annotations(&provider).await.unwrap();

        match outcome {
            MergeOutcome::Applied(report) => assert_eq!(report.mentions_added, 1),
            MergeOutcome::Stale => panic!("fresh fetch reported stale"),
        }
        assert!(!session.is_text_active("https://x/tetr"));

        session.set_text_active("https://x/tetr", true).unwrap();
        assert_eq!(
            session.record().rich_description(),
            Some("[TetR](https://x/tetr) is a repressor.")
        );
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let mut session = open("TetR is a repressor.");
        let provider = MockProvider {
            text: Vec::new(),
            features: Vec::new(),
            available: false,
        };

        let result = session.load_text_annotations(&provider).await;

        assert!(matches!(result, Err(AnnotationError::Extraction(_))));
        assert!(session.text_annotations().annotations().is_empty());
    }

    #[test]
    fn test_stale_after_record_replaced() {
        let mut session = open("TetR is a repressor.");
        let ticket = session.text_fetch_ticket();

        session.replace_record(record("TetR binds tetO.")).unwrap();
        let outcome = session.apply_text_annotations(&ticket, tetr_batch()).unwrap();

        assert!(outcome.is_stale());
        assert!(session.text_annotations().annotations().is_empty());
        assert_ne!(ticket.document_id, session.document_id());
    }

    #[test]
    fn test_stale_after_description_edit() {
        let mut session = open("TetR is a repressor.");
        let ticket = session.text_fetch_ticket();

        session.edit_description("The TetR protein is a repressor.").unwrap();
        let outcome = session.apply_text_annotations(&ticket, tetr_batch()).unwrap();

        assert!(outcome.is_stale());
        assert_eq!(session.record().description(), Some("The TetR protein is a repressor."));
    }

    #[test]
    fn test_local_add_while_fetch_in_flight() {
        let mut session = open("TetR is a repressor.");
        let ticket = session.text_fetch_ticket();

        session.create_text_annotation("https://x/local", "TetR").unwrap();
        let pending = session.prepare_mention("https://x/local", Span::new(0, 4)).unwrap();
        session.commit_mention(&pending, TrailingChoice::Keep).unwrap();

        let outcome = session.apply_text_annotations(&ticket, tetr_batch()).unwrap();

        assert_eq!(
            outcome,
            MergeOutcome::Applied(MergeReport {
                annotations_added: 1,
                mentions_added: 0,
                mentions_dropped: 1,
            })
        );
        assert_eq!(
            session.record().rich_description(),
            Some("[TetR](https://x/local) is a repressor.")
        );
    }

    #[tokio::test]
    async fn test_load_sequence_annotations() {
        let mut session = open("TetR is a repressor.");
        let provider = MockProvider::with_features(vec![
            SequenceFeature::new("https://x/feat/tetR", "tetR", 1, 621),
        ]);

        let outcome = session.load_sequence_annotations(&provider).await.unwrap();
        assert_eq!(
            outcome,
            MergeOutcome::Applied(MergeReport { annotations_added: 1, ..Default::default() })
        );
        assert!(!session.is_sequence_active("https://x/feat/tetR"));

        session.set_sequence_active("https://x/feat/tetR", true).unwrap();
        assert!(session.record().has_sequence_annotation("https://x/feat/tetR"));
    }

    #[test]
    fn test_sequence_fetch_survives_description_edit() {
        let mut session = open("TetR is a repressor.");
        let ticket = session.sequence_fetch_ticket();
        assert_eq!(ticket.payload, "<sbol/>");

        session.edit_description("TetR represses.").unwrap();
        let outcome = session.apply_sequence_annotations(
            &ticket,
            vec![SequenceFeature::new("https://x/feat/tetR", "tetR", 1, 621)],
        );

        assert!(!outcome.is_stale());
    }

    #[test]
    fn test_record_properties_change_log() {
        let mut session = open("");
        session.drain_changes();

        assert!(session.add_target_organism("https://identifiers.org/taxonomy:562"));
        assert!(!session.add_target_organism("https://identifiers.org/taxonomy:562"));
        assert!(session.add_protein("https://identifiers.org/uniprot:P04483"));
        assert!(session.remove_protein("https://identifiers.org/uniprot:P04483"));
        assert!(!session.remove_reference("https://doi.org/10.1000/1"));

        assert_eq!(session.drain_changes().len(), 3);
        assert_eq!(session.record().target_organisms().len(), 1);
    }
}
