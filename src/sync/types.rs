//! Sync data types
//!
//! Defines types for bringing the stores up to date:
//! - Fetch tickets identifying an in-flight extraction request
//! - Merge and edit reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of an extraction request, captured when it is issued
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchTicket {
    pub request_id: Uuid,
    /// Document the request was issued for
    pub document_id: Uuid,
    /// Description buffer revision at issue time
    pub text_revision: u64,
    /// Text sent to the service
    pub payload: String,
    pub issued_at: DateTime<Utc>,
}

impl FetchTicket {
    pub fn new(document_id: Uuid, text_revision: u64, payload: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            document_id,
            text_revision,
            payload: payload.into(),
            issued_at: Utc::now(),
        }
    }
}

/// Counts from one merge of fetched annotations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    /// Annotations (or sequence features) new to the store
    pub annotations_added: usize,
    pub mentions_added: usize,
    /// Mentions dropped for overlapping or falling outside the text
    pub mentions_dropped: usize,
}

/// Result of applying a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied(MergeReport),
    /// The fetch belongs to a replaced document or an edited description
    Stale,
}

impl MergeOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// Result of a description edit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditReport {
    /// Buffer revision after the edit
    pub revision: u64,
    /// Mentions whose range changed
    pub moved: usize,
    /// Annotations that lost a mention to this edit, one entry per mention
    pub orphaned: Vec<String>,
}
