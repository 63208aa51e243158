//! Snapshot model pushed to subscribers and served by the snapshot endpoint.

use serde::{Deserialize, Serialize};

use super::Session;

/// Every live session at a given store revision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub revision_id: i64,
    pub generated_at: String,
    pub sessions: Vec<Session>,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
