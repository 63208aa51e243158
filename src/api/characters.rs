//! Character search endpoint.

use axum::extract::{Query, State};
use serde::Deserialize;

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::CandidateCharacter;
use crate::roster::normalize_siblings;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CharacterSearchQuery {
    #[serde(default)]
    pub name: String,
}

/// GET /api/characters/search?name= - Account siblings of a character, main first.
pub async fn search_characters(
    State(state): State<AppState>,
    Query(params): Query<CharacterSearchQuery>,
) -> ApiResult<Vec<CandidateCharacter>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let name = params.name.trim();
    if name.is_empty() {
        return error(
            AppError::Validation("Character name is required".to_string()),
            revision_id,
        );
    }

    match state.lookup.siblings(name).await {
        Ok(raw) => success(normalize_siblings(raw), revision_id),
        Err(e) => error(e, revision_id),
    }
}
