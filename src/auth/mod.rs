//! Authentication and authorization.
//!
//! Three layers: a pre-shared API key guarding `/api` (compared in constant
//! time), the caller's anonymous member id, and an optional signed admin claim.

mod admin;

pub use admin::*;

use axum::{
    extract::{FromRequestParts, Query, Request},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use subtle::ConstantTimeEq;

use crate::errors::{codes, AppError, ErrorDetails, ErrorResponse};
use crate::AppState;

/// Header name for the API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the caller's anonymous member id.
pub const MEMBER_ID_HEADER: &str = "x-member-id";
/// Header carrying a signed admin claim.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// PSK authentication layer function that takes the expected PSK as a parameter.
pub async fn psk_auth_layer(
    expected_psk: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    // If no PSK is configured, allow all requests (dev mode)
    let Some(expected) = expected_psk else {
        return next.run(request).await;
    };

    match provided_key(&request) {
        Some(key) if constant_time_compare(&key, &expected) => next.run(request).await,
        Some(_) => unauthorized_response("Invalid API key"),
        None => unauthorized_response("Missing API key"),
    }
}

/// The API key from `x-api-key`, a bearer token, or the `apiKey` query parameter.
fn provided_key(request: &Request) -> Option<String> {
    let headers = request.headers();

    if let Some(key) = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()) {
        return Some(key.to_string());
    }

    if let Some(bearer) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
    {
        return Some(bearer.to_string());
    }

    Query::<KeyQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(query)| query.api_key)
}

/// Query parameter accepted in place of the header, for WebSocket upgrades.
#[derive(Deserialize)]
struct KeyQuery {
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}

/// The identified caller of a mutating request.
#[derive(Debug, Clone)]
pub struct Requester {
    pub member_id: String,
    pub is_admin: bool,
}

impl Requester {
    /// Allow the action if the caller owns the resource or holds an admin claim.
    pub fn require_owner(&self, owner_id: &str, action: &str) -> Result<(), AppError> {
        if self.is_admin || self.member_id == owner_id {
            return Ok(());
        }
        Err(AppError::Forbidden(format!(
            "Only the member who owns this can {}, or an admin",
            action
        )))
    }
}

impl FromRequestParts<AppState> for Requester {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let member_id = header_value(parts, MEMBER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("Missing member id".to_string()))?;

        let is_admin = match header_value(parts, ADMIN_TOKEN_HEADER) {
            None => false,
            Some(token) => {
                let verifier = state.admin.as_ref().ok_or_else(|| {
                    AppError::Forbidden("Admin override is not enabled".to_string())
                })?;
                let claims = verifier.verify(&token)?;
                tracing::info!("Admin override by {} (member {})", claims.sub, member_id);
                true
            }
        };

        Ok(Requester {
            member_id,
            is_admin,
        })
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
