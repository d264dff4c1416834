//! Sync module for keeping stores consistent with their description
//!
//! Provides:
//! - Best-effort merging of fetched annotations
//! - Repositioning of mentions after a description edit
//! - Fetch tickets for discarding results of stale requests
//!
//! # Stale fetches
//!
//! A fetch is issued with a [`FetchTicket`]. When it resolves, the ticket
//! is compared with the current document identity and description revision
//! before anything is merged. A mismatch yields [`MergeOutcome::Stale`].

mod edit;
mod merge;
mod types;

pub use edit::apply_description_edit;
pub use merge::merge_extracted;
pub use types::{EditReport, FetchTicket, MergeOutcome, MergeReport};
