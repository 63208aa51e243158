//! Change feed.
//!
//! Every committed mutation publishes a [`ChangeNotice`]; subscribers react by
//! re-reading the store, which stays the single source of truth.

use serde::Serialize;
use tokio::sync::broadcast;

/// Buffered notices per subscriber before it starts lagging.
const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

/// What changed, and the store revision after the change.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotice {
    pub kind: ChangeKind,
    pub session_id: String,
    pub revision_id: i64,
}

/// Fan-out hub for change notices.
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeNotice>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeNotice> {
        self.tx.subscribe()
    }

    pub fn publish(&self, kind: ChangeKind, session_id: &str, revision_id: i64) {
        let notice = ChangeNotice {
            kind,
            session_id: session_id.to_string(),
            revision_id,
        };
        // No subscribers is fine.
        let receivers = self.tx.send(notice).unwrap_or(0);
        tracing::debug!(
            "Published {:?} for session {} to {} subscribers",
            kind,
            session_id,
            receivers
        );
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
