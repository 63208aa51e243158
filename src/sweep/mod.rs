//! Periodic deletion of sessions past their start plus the grace window.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tokio::task::JoinHandle;

use crate::db::Repository;
use crate::errors::AppError;
use crate::events::{ChangeFeed, ChangeKind};
use crate::roster;

pub struct ExpirySweeper {
    repo: Arc<Repository>,
    feed: Arc<ChangeFeed>,
    grace: chrono::Duration,
}

impl ExpirySweeper {
    pub fn new(repo: Arc<Repository>, feed: Arc<ChangeFeed>, grace: chrono::Duration) -> Self {
        Self { repo, feed, grace }
    }

    /// Run forever, sweeping once immediately and then every `interval`.
    ///
    /// Failures are logged and retried on the next tick.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            tracing::info!(target: "sweep", "Expiry sweep started ({}s interval)", interval.as_secs());

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_once(Utc::now()).await {
                    tracing::error!(target: "sweep", "Expiry sweep failed: {}", e);
                }
            }
        })
    }

    /// Delete every session expired at `now`, returning the deleted ids.
    ///
    /// Deletes are issued concurrently; one failing does not stop the others.
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        let sessions = self.repo.list_sessions().await?;
        let expired = roster::expired_ids(&sessions, self.grace, now);
        if expired.is_empty() {
            tracing::debug!(target: "sweep", "No expired sessions among {}", sessions.len());
            return Ok(Vec::new());
        }

        let results = join_all(expired.iter().map(|id| self.repo.delete_session(id))).await;

        let mut deleted = Vec::with_capacity(expired.len());
        for (id, result) in expired.into_iter().zip(results) {
            match result {
                Ok(()) => {
                    tracing::info!(target: "sweep", "Deleted expired session {}", id);
                    deleted.push(id);
                }
                // Someone else got there first.
                Err(AppError::NotFound(_)) => {}
                Err(e) => tracing::error!(target: "sweep", "Failed to delete session {}: {}", id, e),
            }
        }

        if !deleted.is_empty() {
            let revision_id = self.repo.get_revision_id().await?;
            for id in &deleted {
                self.feed.publish(ChangeKind::Deleted, id, revision_id);
            }
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::{Roster, SessionKind};
    use chrono::Duration as Span;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_sweep_deletes_only_expired_sessions() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("sweep.sqlite")).await.unwrap();
        let repo = Arc::new(Repository::new(pool));
        let feed = Arc::new(ChangeFeed::new());
        let mut notices = feed.subscribe();

        let now = Utc::now();
        let old = repo
            .create_session("old", now - Span::hours(3), "c", Roster::empty(SessionKind::Raid, 0))
            .await
            .unwrap();
        let recent = repo
            .create_session("recent", now - Span::hours(1), "c", Roster::empty(SessionKind::General, 4))
            .await
            .unwrap();

        let sweeper = ExpirySweeper::new(repo.clone(), feed.clone(), Span::hours(2));
        let deleted = sweeper.run_once(now).await.unwrap();

        assert_eq!(deleted, vec![old.id.clone()]);
        assert!(repo.get_session(&old.id).await.unwrap().is_none());
        assert!(repo.get_session(&recent.id).await.unwrap().is_some());

        let notice = notices.recv().await.unwrap();
        assert_eq!(notice.kind, ChangeKind::Deleted);
        assert_eq!(notice.session_id, old.id);

        // Nothing left to do on the next tick.
        assert!(sweeper.run_once(now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_longer_grace_window_keeps_session() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("sweep.sqlite")).await.unwrap();
        let repo = Arc::new(Repository::new(pool));

        let now = Utc::now();
        repo.create_session("old", now - Span::hours(3), "c", Roster::empty(SessionKind::Raid, 0))
            .await
            .unwrap();

        let sweeper = ExpirySweeper::new(repo.clone(), Arc::new(ChangeFeed::new()), Span::hours(24));
        assert!(sweeper.run_once(now).await.unwrap().is_empty());
        assert_eq!(repo.list_sessions().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_out_of_range_grace_keeps_sweeping() {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("sweep.sqlite")).await.unwrap();
        let repo = Arc::new(Repository::new(pool));

        let now = Utc::now();
        repo.create_session("old", now - Span::days(30), "c", Roster::empty(SessionKind::Raid, 0))
            .await
            .unwrap();

        let sweeper = ExpirySweeper::new(repo.clone(), Arc::new(ChangeFeed::new()), Span::days(200_000_000));
        assert!(sweeper.run_once(now).await.unwrap().is_empty());
        assert!(sweeper.run_once(now).await.unwrap().is_empty());
        assert_eq!(repo.list_sessions().await.unwrap().len(), 1);
    }
}
