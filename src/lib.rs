//! SeqImprove Library
//!
//! Annotation lifecycle and description synchronization for biological
//! sequence records. The command-line binary is in main.rs.
//!
//! # Modules
//!
//! - `buffer`: Base text with toggleable range patches
//! - `annotations`: Markup parsing, overlap guards and the annotation store
//! - `sync`: Merging fetched annotations and following description edits
//! - `extract`: Extraction service client
//! - `record`: Sequence record and document traits
//! - `session`: Context object tying a record to its stores

pub mod annotations;
pub mod buffer;
pub mod config;
pub mod error;
pub mod extract;
pub mod record;
pub mod session;
pub mod sync;
pub mod text;

pub use error::{AnnotationError, Result};
pub use session::{Change, Session};
