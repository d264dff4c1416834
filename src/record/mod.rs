//! Sequence record
//!
//! In-memory record for one biological part: a URI, an optional sequence,
//! sequence annotations, and a property store keyed by predicate URI.

mod features;
mod traits;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use features::{SequenceAnnotationStore, SequenceFeature, SequenceFeatureChanges};
pub use traits::{DescriptionDocument, FeatureDocument};

use crate::annotations::display_id;

/// Predicate URIs used by the record
pub mod predicates {
    pub const DESCRIPTION: &str = "http://purl.org/dc/terms/description";
    pub const TITLE: &str = "http://purl.org/dc/terms/title";
    pub const ROLE: &str = "http://sbols.org/v2#role";
    pub const RICH_DESCRIPTION: &str = "https://seqimprove.org/richDescription";
    pub const TARGET_ORGANISM: &str = "https://seqimprove.org/targetOrganism";
    pub const PROTEIN: &str = "https://seqimprove.org/protein";
    pub const REFERENCE: &str = "https://seqimprove.org/reference";
}

/// A sequence record and its properties
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceRecord {
    uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sequence: Option<String>,
    /// Raw serialized form, sent to sequence extraction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(default)]
    sequence_annotations: Vec<SequenceFeature>,
    #[serde(default)]
    properties: BTreeMap<String, Vec<String>>,
}

impl SequenceRecord {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Default::default()
        }
    }

    pub fn with_sequence(mut self, sequence: impl Into<String>) -> Self {
        self.sequence = Some(sequence.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.set_property(predicates::DESCRIPTION, description);
        self
    }

    pub fn with_sequence_annotation(mut self, feature: SequenceFeature) -> Self {
        self.sequence_annotations.push(feature);
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Last path segment of the URI
    pub fn display_id(&self) -> &str {
        display_id(&self.uri)
    }

    pub fn sequence(&self) -> Option<&str> {
        self.sequence.as_deref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// First value of a predicate
    pub fn property(&self, predicate: &str) -> Option<&str> {
        self.properties
            .get(predicate)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// All values of a predicate
    pub fn properties(&self, predicate: &str) -> &[String] {
        self.properties
            .get(predicate)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Replace every value of a predicate with `value`
    pub fn set_property(&mut self, predicate: &str, value: impl Into<String>) {
        self.properties
            .insert(predicate.to_string(), vec![value.into()]);
    }

    /// Add a value unless already present. Returns whether it was added.
    pub fn add_property(&mut self, predicate: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let values = self.properties.entry(predicate.to_string()).or_default();
        if values.contains(&value) {
            return false;
        }
        values.push(value);
        true
    }

    /// Remove one value. Returns whether it was present.
    pub fn remove_property(&mut self, predicate: &str, value: &str) -> bool {
        let Some(values) = self.properties.get_mut(predicate) else {
            return false;
        };
        let before = values.len();
        values.retain(|v| v != value);
        let removed = values.len() != before;
        if values.is_empty() {
            self.properties.remove(predicate);
        }
        removed
    }

    pub fn title(&self) -> Option<&str> {
        self.property(predicates::TITLE)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.set_property(predicates::TITLE, title);
    }

    pub fn role(&self) -> Option<&str> {
        self.property(predicates::ROLE)
    }

    /// Set the single role, replacing any existing roles
    pub fn set_role(&mut self, role: impl Into<String>) {
        self.set_property(predicates::ROLE, role);
    }

    pub fn target_organisms(&self) -> &[String] {
        self.properties(predicates::TARGET_ORGANISM)
    }

    pub fn add_target_organism(&mut self, uri: impl Into<String>) -> bool {
        self.add_property(predicates::TARGET_ORGANISM, uri)
    }

    pub fn remove_target_organism(&mut self, uri: &str) -> bool {
        self.remove_property(predicates::TARGET_ORGANISM, uri)
    }

    pub fn proteins(&self) -> &[String] {
        self.properties(predicates::PROTEIN)
    }

    pub fn add_protein(&mut self, uri: impl Into<String>) -> bool {
        self.add_property(predicates::PROTEIN, uri)
    }

    pub fn remove_protein(&mut self, uri: &str) -> bool {
        self.remove_property(predicates::PROTEIN, uri)
    }

    pub fn references(&self) -> &[String] {
        self.properties(predicates::REFERENCE)
    }

    pub fn add_reference(&mut self, uri: impl Into<String>) -> bool {
        self.add_property(predicates::REFERENCE, uri)
    }

    pub fn remove_reference(&mut self, uri: &str) -> bool {
        self.remove_property(predicates::REFERENCE, uri)
    }

    /// Seed the rich description from the plain one if it is missing
    pub fn ensure_rich_description(&mut self) {
        if self.rich_description().is_some() {
            return;
        }
        let seed = self.description().unwrap_or_default().to_string();
        self.set_rich_description(seed);
    }
}

impl DescriptionDocument for SequenceRecord {
    fn description(&self) -> Option<&str> {
        self.property(predicates::DESCRIPTION)
    }

    fn set_description(&mut self, text: String) {
        self.set_property(predicates::DESCRIPTION, text);
    }

    fn rich_description(&self) -> Option<&str> {
        self.property(predicates::RICH_DESCRIPTION)
    }

    fn set_rich_description(&mut self, text: String) {
        self.set_property(predicates::RICH_DESCRIPTION, text);
    }
}

impl FeatureDocument for SequenceRecord {
    fn sequence_annotations(&self) -> &[SequenceFeature] {
        &self.sequence_annotations
    }

    fn annotate_range(&mut self, feature: &SequenceFeature) {
        self.sequence_annotations.push(feature.clone());
    }

    fn remove_sequence_annotation(&mut self, id: &str) -> bool {
        let before = self.sequence_annotations.len();
        self.sequence_annotations.retain(|f| f.id != id);
        self.sequence_annotations.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_rich_description_seeds_from_plain() {
        let mut record = SequenceRecord::new("https://x/parts/BBa_C0040")
            .with_description("TetR is a repressor.");
        record.ensure_rich_description();

        assert_eq!(record.rich_description(), Some("TetR is a repressor."));

        record.set_rich_description("[TetR](https://x/tetr) is a repressor.".to_string());
        record.ensure_rich_description();
        assert_eq!(
            record.rich_description(),
            Some("[TetR](https://x/tetr) is a repressor.")
        );
    }

    #[test]
    fn test_ensure_rich_description_without_description() {
        let mut record = SequenceRecord::new("https://x/parts/empty");
        record.ensure_rich_description();

        assert_eq!(record.rich_description(), Some(""));
    }

    #[test]
    fn test_uri_properties() {
        let mut record = SequenceRecord::new("https://x/parts/p1");

        assert!(record.add_target_organism("https://identifiers.org/taxonomy:562"));
        assert!(!record.add_target_organism("https://identifiers.org/taxonomy:562"));
        assert!(record.add_protein("https://identifiers.org/uniprot:P04483"));
        assert!(record.add_reference("https://doi.org/10.1000/1"));

        assert_eq!(record.target_organisms().len(), 1);
        assert_eq!(record.proteins(), ["https://identifiers.org/uniprot:P04483"]);

        assert!(record.remove_reference("https://doi.org/10.1000/1"));
        assert!(!record.remove_reference("https://doi.org/10.1000/1"));
        assert!(record.references().is_empty());
    }

    #[test]
    fn test_set_role_replaces() {
        let mut record = SequenceRecord::new("https://x/parts/p1");
        record.add_property(predicates::ROLE, "http://identifiers.org/so/SO:0000141");
        record.add_property(predicates::ROLE, "http://identifiers.org/so/SO:0000167");

        record.set_role("http://identifiers.org/so/SO:0000316");

        assert_eq!(
            record.properties(predicates::ROLE),
            ["http://identifiers.org/so/SO:0000316"]
        );
    }

    #[test]
    fn test_display_id() {
        let record = SequenceRecord::new("https://synbiohub.org/public/igem/BBa_C0040");
        assert_eq!(record.display_id(), "BBa_C0040");
    }

    #[test]
    fn test_sequence_annotations() {
        let mut record = SequenceRecord::new("https://x/parts/p1");
        let feature = SequenceFeature::new("https://x/feat/tetR", "tetR", 10, 630);

        record.annotate_range(&feature);
        assert!(record.has_sequence_annotation("https://x/feat/tetR"));

        assert!(record.remove_sequence_annotation("https://x/feat/tetR"));
        assert!(!record.has_sequence_annotation("https://x/feat/tetR"));
        assert!(!record.remove_sequence_annotation("https://x/feat/tetR"));
    }
}
