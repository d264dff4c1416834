//! Extraction types
//!
//! Shapes returned by the annotation extraction service.

use serde::{Deserialize, Serialize};

use crate::annotations::{display_id, Annotation, Mention};

pub use crate::record::SequenceFeature;

/// A fetched mention, in plain-text coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMention {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// A fetched text annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedAnnotation {
    /// Term URI
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub mentions: Vec<ExtractedMention>,
}

impl ExtractedAnnotation {
    /// Convert to an annotation whose mentions have no patches yet.
    ///
    /// Without a label, the first mention's text is used, then the display id.
    pub fn into_annotation(self) -> Annotation {
        let label = self
            .label
            .or_else(|| self.mentions.first().map(|m| m.text.clone()))
            .unwrap_or_else(|| display_id(&self.id).to_string());

        let mentions = self
            .mentions
            .into_iter()
            .map(|m| Mention::new(m.start, m.end, m.text))
            .collect();

        Annotation::new(self.id, label).with_mentions(mentions)
    }
}

/// Extraction error types
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Extraction provider not available: {0}")]
    ProviderNotAvailable(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid extraction config: {0}")]
    InvalidConfig(String),
}
