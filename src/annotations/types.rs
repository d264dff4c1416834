//! Text annotation types
//!
//! An [`Annotation`] links an ontology term (its `id`, a URI) to one or more
//! [`Mention`]s: byte ranges of the plain description text.

use serde::{Deserialize, Serialize};

use crate::buffer::{PatchId, Span};

/// A single occurrence of an annotation in the plain text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mention {
    /// Start byte offset in the plain text
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Surface text of the mention
    pub text: String,
    /// Patch in the description buffer that decorates this mention
    #[serde(skip)]
    pub patch: Option<PatchId>,
}

impl Mention {
    /// Create a mention that is not yet bound to a patch
    pub fn new(start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            patch: None,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Covers no text, as after an edit deleted it. Vacant mentions never conflict.
    pub fn is_vacant(&self) -> bool {
        self.start == self.end
    }
}

/// A named concept with its mentions in the description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Term URI
    pub id: String,
    /// Human-readable label
    pub label: String,
    /// Mentions in order of appearance or insertion
    pub mentions: Vec<Mention>,
}

impl Annotation {
    /// Create an annotation with no mentions
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            mentions: Vec::new(),
        }
    }

    pub fn with_mentions(mut self, mentions: Vec<Mention>) -> Self {
        self.mentions = mentions;
        self
    }

    /// Last path segment of the id
    pub fn display_id(&self) -> &str {
        display_id(&self.id)
    }
}

/// Last path segment of a term URI (may be empty for a trailing slash)
pub fn display_id(id: &str) -> &str {
    id.rsplit_once('/').map(|(_, tail)| tail).unwrap_or(id)
}

/// Field changes for [`AnnotationStore::edit_annotation`](super::AnnotationStore::edit_annotation)
#[derive(Debug, Clone, Default)]
pub struct AnnotationChanges {
    pub id: Option<String>,
    pub label: Option<String>,
    pub mentions: Option<Vec<Mention>>,
}

impl AnnotationChanges {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn mentions(mut self, mentions: Vec<Mention>) -> Self {
        self.mentions = Some(mentions);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.label.is_none() && self.mentions.is_none()
    }
}
