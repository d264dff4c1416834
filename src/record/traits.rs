//! Document traits
//!
//! The hooks the annotation stores use to read and write the record they
//! annotate. Persistence of the record is not covered here.

use super::features::SequenceFeature;

/// Plain and decorated description of a record
pub trait DescriptionDocument {
    /// Plain description, without markup
    fn description(&self) -> Option<&str>;

    fn set_description(&mut self, text: String);

    /// Decorated description, with active annotations inlined as markup
    fn rich_description(&self) -> Option<&str>;

    fn set_rich_description(&mut self, text: String);
}

/// Sequence annotations held by a record
pub trait FeatureDocument {
    /// Sequence annotations currently on the record
    fn sequence_annotations(&self) -> &[SequenceFeature];

    /// Whether a sequence annotation with this persistent identity exists
    fn has_sequence_annotation(&self, id: &str) -> bool {
        self.sequence_annotations().iter().any(|f| f.id == id)
    }

    /// Annotate the feature's range on the record
    fn annotate_range(&mut self, feature: &SequenceFeature);

    /// Remove the sequence annotation with this persistent identity.
    /// Returns `false` if there was none.
    fn remove_sequence_annotation(&mut self, id: &str) -> bool;
}
