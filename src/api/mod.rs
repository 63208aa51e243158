//! REST API module.
//!
//! Contains all API routes and handlers following the browser client contract.

mod characters;
mod roster;
mod sessions;
mod snapshot;
mod subscribe;

pub use characters::*;
pub use roster::*;
pub use sessions::*;
pub use snapshot::*;
pub use subscribe::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::events::ChangeKind;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: crate::errors::AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Read the revision after a committed mutation and announce it to subscribers.
pub async fn announce(state: &AppState, kind: ChangeKind, session_id: &str, fallback: i64) -> i64 {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(fallback);
    state.feed.publish(kind, session_id, revision_id);
    revision_id
}
