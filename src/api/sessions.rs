//! Session API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::{announce, error, success, ApiResult};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::events::ChangeKind;
use crate::models::{
    CreateSessionRequest, Roster, Session, SessionKind, SessionStats, UpdateSessionRequest,
    DEFAULT_GENERAL_SIZE, MAX_GENERAL_SIZE,
};
use crate::roster;
use crate::AppState;

/// GET /api/sessions - List all sessions, earliest first.
pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Vec<Session>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_sessions().await {
        Ok(sessions) => success(sessions, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/sessions/:id - Get a single session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Session> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.require_session(&id).await {
        Ok(session) => success(session, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/sessions/:id/stats - Occupancy and average combat power.
pub async fn session_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SessionStats> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.require_session(&id).await {
        Ok(session) => success(roster::stats(&session.roster), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/sessions - Create a new session.
pub async fn create_session(
    State(state): State<AppState>,
    requester: Requester,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<Session> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let name = match required_name(&request.name) {
        Ok(name) => name,
        Err(e) => return error(e, revision_id),
    };
    let scheduled_start =
        match parse_start(&request.date, &request.time, request.utc_offset.as_deref()) {
            Ok(start) => start,
            Err(e) => return error(e, revision_id),
        };
    let roster = match request.kind {
        SessionKind::Raid => Roster::empty(SessionKind::Raid, 0),
        SessionKind::General => {
            let size = request.size.unwrap_or(DEFAULT_GENERAL_SIZE);
            if !(1..=MAX_GENERAL_SIZE).contains(&size) {
                return error(
                    AppError::Validation(format!(
                        "Size must be between 1 and {}",
                        MAX_GENERAL_SIZE
                    )),
                    revision_id,
                );
            }
            Roster::empty(SessionKind::General, size)
        }
    };

    match state
        .repo
        .create_session(name, scheduled_start, &requester.member_id, roster)
        .await
    {
        Ok(session) => {
            tracing::info!(
                "Session {} ({}) created by {}",
                session.id,
                request.kind.as_str(),
                requester.member_id
            );
            let new_revision =
                announce(&state, ChangeKind::Created, &session.id, revision_id).await;
            success(session, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/sessions/:id - Change name and start time (creator or admin).
pub async fn update_session(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
    Json(request): Json<UpdateSessionRequest>,
) -> ApiResult<Session> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match edit_details(&state, &requester, &id, &request).await {
        Ok(session) => {
            let new_revision = announce(&state, ChangeKind::Updated, &id, revision_id).await;
            success(session, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

async fn edit_details(
    state: &AppState,
    requester: &Requester,
    id: &str,
    request: &UpdateSessionRequest,
) -> Result<Session, AppError> {
    let name = required_name(&request.name)?;
    let scheduled_start = parse_start(&request.date, &request.time, request.utc_offset.as_deref())?;

    let existing = state.repo.require_session(id).await?;
    requester.require_owner(&existing.creator_id, "edit this session")?;

    state
        .repo
        .update_session_details(id, name, scheduled_start)
        .await
}

/// DELETE /api/sessions/:id - Delete a session (creator or admin).
pub async fn delete_session(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let result = async {
        let existing = state.repo.require_session(&id).await?;
        requester.require_owner(&existing.creator_id, "delete this session")?;
        state.repo.delete_session(&id).await
    }
    .await;

    match result {
        Ok(()) => {
            tracing::info!("Session {} deleted by {}", id, requester.member_id);
            let new_revision = announce(&state, ChangeKind::Deleted, &id, revision_id).await;
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

fn required_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Session name is required".to_string()));
    }
    Ok(name)
}

/// Combine `YYYY-MM-DD`, `HH:MM` and an optional `+HH:MM` offset into a UTC instant.
pub fn parse_start(
    date: &str,
    time: &str,
    utc_offset: Option<&str>,
) -> Result<DateTime<Utc>, AppError> {
    let (date, time) = (date.trim(), time.trim());
    if date.is_empty() || time.is_empty() {
        return Err(AppError::Validation("Date and time are required".to_string()));
    }

    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date '{}'", date)))?;
    let time = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| AppError::Validation(format!("Invalid time '{}'", time)))?;
    let offset = utc_offset.map(str::trim).unwrap_or("+00:00");

    let stamp = format!("{}T{}{}", date.format("%Y-%m-%d"), time.format("%H:%M:%S"), offset);
    DateTime::parse_from_rfc3339(&stamp)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::Validation(format!("Invalid UTC offset '{}'", offset)))
}
