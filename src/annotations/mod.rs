//! Text annotations
//!
//! Provides:
//! - Inline markup matching (`[mention text](annotation id)`)
//! - Parsing a decorated description into plain text and annotations
//! - Overlap predicates for mentions
//! - The per-description annotation store with activation toggling
//!
//! # Representations
//!
//! A description exists in two forms. The plain form is the buffer's base
//! text; mention offsets are expressed against it. The decorated form is
//! the buffer rendered with the patches of active annotations enabled.

mod markup;
mod overlap;
mod parser;
mod store;
mod types;

pub use markup::{contains_markup_for, format_markup, MarkupMatch, MarkupPattern, ANY_ID};
pub use overlap::{find_conflict, overlaps, touches};
pub use parser::{parse_description, ParsedDescription};
pub use store::{AnnotationStore, PendingMention, TrailingChoice};
pub use types::{display_id, Annotation, AnnotationChanges, Mention};
