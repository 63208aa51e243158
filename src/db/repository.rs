//! Session repository.
//!
//! Every session is one row; the roster is stored as a JSON document and
//! rewritten whole on each change (last write wins).

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{RevisionInfo, Roster, Session, Snapshot};

const SESSION_COLUMNS: &str =
    "id, name, scheduled_start, creator_id, created_at, roster";

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        let row = sqlx::query(
            "UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1 RETURNING revision_id",
        )
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("revision_id"))
    }

    /// Every session together with the current revision.
    pub async fn get_snapshot(&self) -> Result<Snapshot, AppError> {
        let info = self.get_revision_info().await?;
        let sessions = self.list_sessions().await?;

        Ok(Snapshot {
            revision_id: info.revision_id,
            generated_at: info.generated_at,
            sessions,
        })
    }

    /// List all sessions, earliest start first.
    pub async fn list_sessions(&self) -> Result<Vec<Session>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM sessions ORDER BY scheduled_start, created_at",
            SESSION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(session_from_row).collect()
    }

    /// Get a session by ID.
    pub async fn get_session(&self, id: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM sessions WHERE id = ?",
            SESSION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    /// Get a session by ID or fail with `NotFound`.
    pub async fn require_session(&self, id: &str) -> Result<Session, AppError> {
        self.get_session(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
    }

    /// Create a new session with an empty roster.
    pub async fn create_session(
        &self,
        name: &str,
        scheduled_start: DateTime<Utc>,
        creator_id: &str,
        roster: Roster,
    ) -> Result<Session, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO sessions (id, name, scheduled_start, creator_id, created_at, roster, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(name)
        .bind(scheduled_start)
        .bind(creator_id)
        .bind(now)
        .bind(Json(&roster))
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(Session {
            id,
            name: name.to_string(),
            scheduled_start,
            creator_id: creator_id.to_string(),
            created_at: now,
            roster,
        })
    }

    /// Change a session's name and start time.
    pub async fn update_session_details(
        &self,
        id: &str,
        name: &str,
        scheduled_start: DateTime<Utc>,
    ) -> Result<Session, AppError> {
        let result = sqlx::query(
            "UPDATE sessions SET name = ?, scheduled_start = ?, updated_at = ? WHERE id = ?",
        )
        .bind(name)
        .bind(scheduled_start)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Session {} not found", id)));
        }

        self.increment_revision().await?;
        self.require_session(id).await
    }

    /// Overwrite a session's roster document.
    pub async fn save_roster(&self, id: &str, roster: &Roster) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE sessions SET roster = ?, updated_at = ? WHERE id = ?")
            .bind(Json(roster))
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Session {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }

    /// Delete a session.
    pub async fn delete_session(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Session {} not found", id)));
        }

        self.increment_revision().await?;
        Ok(())
    }
}

fn session_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Session, AppError> {
    let roster: Json<Roster> = row.try_get("roster")?;
    Ok(Session {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        scheduled_start: row.try_get("scheduled_start")?,
        creator_id: row.try_get("creator_id")?,
        created_at: row.try_get("created_at")?,
        roster: roster.0,
    })
}
