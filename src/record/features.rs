//! Sequence annotations
//!
//! Features located on the sequence itself rather than in the description.
//! A feature is active when the record holds a sequence annotation with the
//! feature's id as its persistent identity.

use serde::{Deserialize, Serialize};

use super::traits::FeatureDocument;
use crate::error::{AnnotationError, Result};

/// A located feature on the sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceFeature {
    pub id: String,
    pub name: String,
    /// `[start, end]` on the sequence
    pub location: [usize; 2],
}

impl SequenceFeature {
    pub fn new(id: impl Into<String>, name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: [start, end],
        }
    }

    pub fn start(&self) -> usize {
        self.location[0]
    }

    pub fn end(&self) -> usize {
        self.location[1]
    }
}

/// Field changes for [`SequenceAnnotationStore::edit`]
#[derive(Debug, Clone, Default)]
pub struct SequenceFeatureChanges {
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<[usize; 2]>,
}

/// Sequence features of one record
#[derive(Debug, Clone, Default)]
pub struct SequenceAnnotationStore {
    features: Vec<SequenceFeature>,
}

impl SequenceAnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from the annotations the record already holds
    pub fn from_document<D: FeatureDocument + ?Sized>(doc: &D) -> Self {
        Self {
            features: doc.sequence_annotations().to_vec(),
        }
    }

    pub fn features(&self) -> &[SequenceFeature] {
        &self.features
    }

    pub fn get(&self, id: &str) -> Option<&SequenceFeature> {
        self.features.iter().find(|f| f.id == id)
    }

    pub fn add(&mut self, feature: SequenceFeature) -> Result<()> {
        if self.get(&feature.id).is_some() {
            return Err(AnnotationError::DuplicateId(feature.id));
        }
        validate_location(feature.location)?;
        self.features.push(feature);
        Ok(())
    }

    /// Remove a feature, taking it off the record first. No-op if absent.
    pub fn remove<D: FeatureDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        id: &str,
    ) -> Option<SequenceFeature> {
        let index = self.features.iter().position(|f| f.id == id)?;
        doc.remove_sequence_annotation(id);
        Some(self.features.remove(index))
    }

    /// Edit a feature. An active feature is deactivated, changed and
    /// reactivated under its new id.
    pub fn edit<D: FeatureDocument + ?Sized>(
        &mut self,
        doc: &mut D,
        id: &str,
        changes: SequenceFeatureChanges,
    ) -> Result<()> {
        let index = self
            .features
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| AnnotationError::NotFound(id.to_string()))?;

        if let Some(new_id) = &changes.id {
            if new_id != id && self.get(new_id).is_some() {
                return Err(AnnotationError::DuplicateId(new_id.clone()));
            }
        }
        if let Some(location) = changes.location {
            validate_location(location)?;
        }

        let was_active = self.is_active(doc, id);
        if was_active {
            self.set_active(doc, id, false)?;
        }

        let feature = &mut self.features[index];
        if let Some(new_id) = changes.id {
            feature.id = new_id;
        }
        if let Some(name) = changes.name {
            feature.name = name;
        }
        if let Some(location) = changes.location {
            feature.location = location;
        }

        if was_active {
            let new_id = feature.id.clone();
            self.set_active(doc, &new_id, true)?;
        }
        Ok(())
    }

    pub fn is_active<D: FeatureDocument + ?Sized>(&self, doc: &D, id: &str) -> bool {
        doc.has_sequence_annotation(id)
    }

    /// Annotate or remove the feature's range on the record
    pub fn set_active<D: FeatureDocument + ?Sized>(
        &self,
        doc: &mut D,
        id: &str,
        active: bool,
    ) -> Result<()> {
        let feature = self
            .get(id)
            .ok_or_else(|| AnnotationError::NotFound(id.to_string()))?;

        match (active, doc.has_sequence_annotation(id)) {
            (true, false) => doc.annotate_range(feature),
            (false, true) => {
                doc.remove_sequence_annotation(id);
            }
            _ => {}
        }
        tracing::debug!("Sequence feature {} active: {}", id, active);
        Ok(())
    }

    /// Append fetched features whose ids are not present yet.
    /// Returns how many were added.
    pub fn merge(&mut self, fetched: Vec<SequenceFeature>) -> usize {
        let mut added = 0;
        for feature in fetched {
            if self.get(&feature.id).is_some() {
                continue;
            }
            if let Err(e) = validate_location(feature.location) {
                tracing::warn!("Dropping sequence feature {}: {}", feature.id, e);
                continue;
            }
            self.features.push(feature);
            added += 1;
        }
        added
    }
}

fn validate_location([start, end]: [usize; 2]) -> Result<()> {
    if start > end {
        return Err(AnnotationError::InvalidRange {
            start,
            end,
            reason: "start is after end".to_string(),
        });
    }
    Ok(())
}
