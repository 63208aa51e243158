//! Game API client for character lookups.
//!
//! Two calls are used: the sibling list of a character's account, and the
//! armory profile for combat power. Only the sibling lookup can fail the
//! surrounding operation; combat power degrades to `Unavailable`.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{CombatPower, RawCharacter};

/// Request timeout for game API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ArmoryResponse {
    #[serde(default)]
    armory_profile: Option<ArmoryProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ArmoryProfile {
    #[serde(default)]
    combat_power: Option<serde_json::Value>,
}

/// HTTP client for the game API.
pub struct CharacterLookup {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CharacterLookup {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn api_key(&self) -> Result<&str, AppError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::Validation("Game API key is not configured".to_string()))
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Internal(format!("Invalid game API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Game API base URL cannot hold a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET /characters/{name}/siblings
    pub async fn siblings(&self, name: &str) -> Result<Vec<RawCharacter>, AppError> {
        let api_key = self.api_key()?;
        let url = self.endpoint(&["characters", name, "siblings"])?;

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Sibling lookup for {} failed with {}", name, status);
            return Err(status_error(status));
        }

        // The API answers `null` rather than `[]` for unknown names.
        let siblings: Option<Vec<RawCharacter>> = response.json().await?;
        let siblings = siblings.unwrap_or_default();

        if siblings.is_empty() {
            return Err(AppError::NotFound(format!(
                "No characters found for '{}'",
                name
            )));
        }

        tracing::debug!("Found {} siblings for {}", siblings.len(), name);
        Ok(siblings)
    }

    /// GET /armories/characters/{name}?filters=profiles
    ///
    /// Any failure, including a missing key, yields `Unavailable`.
    pub async fn combat_power(&self, name: &str) -> CombatPower {
        match self.fetch_combat_power(name).await {
            Ok(Some(power)) => CombatPower::Known(power),
            Ok(None) => CombatPower::Unavailable,
            Err(e) => {
                tracing::debug!("Combat power lookup for {} failed: {}", name, e);
                CombatPower::Unavailable
            }
        }
    }

    async fn fetch_combat_power(&self, name: &str) -> Result<Option<String>, AppError> {
        let api_key = self.api_key()?;
        let url = self.endpoint(&["armories", "characters", name])?;

        let response = self
            .client
            .get(url)
            .query(&[("filters", "profiles")])
            .header(reqwest::header::ACCEPT, "application/json")
            .bearer_auth(api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let body: Option<ArmoryResponse> = response.json().await?;
        let power = body
            .and_then(|b| b.armory_profile)
            .and_then(|p| p.combat_power)
            .and_then(|v| match v {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            });

        Ok(power)
    }
}

/// Map a non-success game API status to a fixed user-facing error.
pub fn status_error(status: StatusCode) -> AppError {
    match status {
        StatusCode::BAD_REQUEST => {
            AppError::BadRequest("The game API rejected the request".to_string())
        }
        StatusCode::UNAUTHORIZED => {
            AppError::Upstream("The game API key is invalid or expired".to_string())
        }
        StatusCode::NOT_FOUND => AppError::NotFound("Character not found".to_string()),
        StatusCode::TOO_MANY_REQUESTS => AppError::RateLimited(
            "Too many requests to the game API, please try again shortly".to_string(),
        ),
        s if s.is_server_error() => AppError::Upstream(
            "The game API is unavailable (maintenance or server error)".to_string(),
        ),
        s => AppError::Upstream(format!("Game API error: {}", s.as_u16())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS),
            AppError::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE),
            AppError::Upstream(_)
        ));
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST),
            AppError::BadRequest(_)
        ));
        assert_eq!(
            status_error(StatusCode::IM_A_TEAPOT).message(),
            "Game API error: 418"
        );
    }

    #[test]
    fn test_endpoint_encodes_names() {
        let lookup = CharacterLookup::new("https://api.example.com/", Some("k".into()));
        let url = lookup.endpoint(&["characters", "a b/c", "siblings"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/characters/a%20b%2Fc/siblings"
        );
        let url = lookup.endpoint(&["armories", "characters", "호크"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/armories/characters/%ED%98%B8%ED%81%AC"
        );
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let lookup = CharacterLookup::new("http://127.0.0.1:9", None);
        let err = lookup.siblings("Aria").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(lookup.combat_power("Aria").await, CombatPower::Unavailable);
    }
}
