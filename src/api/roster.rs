//! Roster API endpoints: assign, remove, combat-power sync.

use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    Json,
};
use futures::future::join_all;

use super::{announce, error, success, ApiResult};
use crate::auth::Requester;
use crate::errors::AppError;
use crate::events::ChangeKind;
use crate::models::{AssignRequest, AssignedCharacter, CandidateCharacter, RemoveRequest, Session};
use crate::roster::{self, normalize_siblings};
use crate::AppState;

/// POST /api/sessions/:id/assign - Place (or move) a character into a slot.
pub async fn assign_character(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
    Json(request): Json<AssignRequest>,
) -> ApiResult<Session> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match assign(&state, requester, &id, request).await {
        Ok(session) => {
            let new_revision = announce(&state, ChangeKind::Updated, &id, revision_id).await;
            success(session, new_revision)
        }
        Err(e) => {
            tracing::debug!("Assignment to {} rejected: {}", id, e);
            error(e, revision_id)
        }
    }
}

async fn assign(
    state: &AppState,
    requester: Requester,
    id: &str,
    request: AssignRequest,
) -> Result<Session, AppError> {
    let candidate = request.character;
    if candidate.name.trim().is_empty() || candidate.display_name.trim().is_empty() {
        return Err(AppError::Validation(
            "Character name and display name are required".to_string(),
        ));
    }

    // Unknown sessions and impossible targets never reach the game API.
    let session = state.repo.require_session(id).await?;
    roster::check_target(&session.roster, request.target)?;

    let (display_name, combat_power) = tokio::join!(
        resolve_display_name(state, &candidate),
        state.lookup.combat_power(&candidate.name),
    );
    let candidate = CandidateCharacter {
        display_name,
        ..candidate
    };
    let character = AssignedCharacter::from_candidate(candidate, combat_power, requester.member_id);

    // Re-read so assignments made during the lookups survive.
    let session = state.repo.require_session(id).await?;
    let roster = roster::assign(&session.roster, character, request.target)?;
    state.repo.save_roster(id, &roster).await?;

    Ok(Session { roster, ..session })
}

/// The display name the sibling lookup gives `candidate`, which fixes its family key.
///
/// The client's display name is only trusted when the lookup cannot place the
/// character (game API down, unknown name); a mislabelled alt then slips past
/// the family check.
async fn resolve_display_name(state: &AppState, candidate: &CandidateCharacter) -> String {
    match state.lookup.siblings(&candidate.name).await {
        Ok(raw) => normalize_siblings(raw)
            .into_iter()
            .find(|sibling| sibling.name == candidate.name)
            .map(|sibling| sibling.display_name)
            .unwrap_or_else(|| candidate.display_name.clone()),
        Err(e) => {
            tracing::debug!(
                "Keeping client display name for {}: {}",
                candidate.name,
                e
            );
            candidate.display_name.clone()
        }
    }
}

/// POST /api/sessions/:id/remove - Empty a slot (the member who added it, or an admin).
pub async fn remove_character(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
    Json(request): Json<RemoveRequest>,
) -> ApiResult<Session> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let result = async {
        let session = state.repo.require_session(&id).await?;
        let (roster, removed) = roster::remove(&session.roster, request.slot)?;
        requester.require_owner(&removed.added_by, "remove this character")?;
        state.repo.save_roster(&id, &roster).await?;
        Ok::<_, AppError>(Session { roster, ..session })
    }
    .await;

    match result {
        Ok(session) => {
            let new_revision = announce(&state, ChangeKind::Updated, &id, revision_id).await;
            success(session, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/sessions/:id/sync-combat-power - Refresh missing combat power (creator or admin).
pub async fn sync_combat_power(
    State(state): State<AppState>,
    requester: Requester,
    Path(id): Path<String>,
) -> ApiResult<Session> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match sync(&state, &requester, &id).await {
        Ok((session, true)) => {
            let new_revision = announce(&state, ChangeKind::Updated, &id, revision_id).await;
            success(session, new_revision)
        }
        Ok((session, false)) => success(session, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// Returns the session and whether anything was written.
async fn sync(
    state: &AppState,
    requester: &Requester,
    id: &str,
) -> Result<(Session, bool), AppError> {
    let session = state.repo.require_session(id).await?;
    requester.require_owner(&session.creator_id, "sync combat power")?;

    let names = roster::members_needing_combat_power(&session.roster);
    if names.is_empty() {
        return Ok((session, false));
    }

    let powers = join_all(names.iter().map(|name| state.lookup.combat_power(name))).await;
    let fetched: HashMap<String, _> = names.into_iter().zip(powers).collect();

    // Apply to a fresh read so assignments made during the lookups survive.
    let mut session = state.repo.require_session(id).await?;
    let changed = roster::apply_combat_power(&mut session.roster, &fetched);
    if changed == 0 {
        return Ok((session, false));
    }

    state.repo.save_roster(id, &session.roster).await?;
    tracing::info!("Updated combat power of {} members in session {}", changed, id);
    Ok((session, true))
}
