//! Snapshot API endpoints.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::{RevisionInfo, Snapshot};
use crate::AppState;

/// GET /api/snapshot - Every session at the current revision.
pub async fn get_snapshot(State(state): State<AppState>) -> ApiResult<Snapshot> {
    match state.repo.get_snapshot().await {
        Ok(snapshot) => {
            let revision_id = snapshot.revision_id;
            success(snapshot, revision_id)
        }
        Err(e) => error(e, 0),
    }
}

/// GET /api/snapshot/revision - Current revision, for cheap change polling.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    match state.repo.get_revision_info().await {
        Ok(info) => {
            let revision_id = info.revision_id;
            success(info, revision_id)
        }
        Err(e) => error(e, 0),
    }
}
