//! Error types for the annotation core

use thiserror::Error;

use crate::buffer::BufferError;
use crate::extract::ExtractionError;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, AnnotationError>;

/// Annotation error type
#[derive(Error, Debug)]
pub enum AnnotationError {
    /// A new mention would overlap a mention of `annotation_id`
    #[error("Mention overlaps existing mention {start}..{end} of {annotation_id}")]
    OverlapConflict {
        annotation_id: String,
        start: usize,
        end: usize,
    },

    #[error("Annotation already exists: {0}")]
    DuplicateId(String),

    #[error("Annotation not found: {0}")]
    NotFound(String),

    #[error("Invalid range {start}..{end}: {reason}")]
    InvalidRange {
        start: usize,
        end: usize,
        reason: String,
    },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] BufferError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),
}

impl AnnotationError {
    /// Id of the annotation to highlight for the user, if any
    pub fn conflicting_annotation(&self) -> Option<&str> {
        match self {
            Self::OverlapConflict { annotation_id, .. } => Some(annotation_id),
            _ => None,
        }
    }
}
