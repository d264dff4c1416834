//! Extraction service
//!
//! Fetches annotations for a record from a remote extraction service:
//! - Text annotations for the plain description
//! - Sequence features for the serialized record
//!
//! Results are merged into the stores by [`crate::sync`].

mod provider;
mod types;

pub use provider::{ExtractionProvider, HttpExtractionProvider};
pub use types::{ExtractedAnnotation, ExtractedMention, ExtractionError, SequenceFeature};

#[cfg(test)]
pub use provider::MockProvider;
