//! Signed admin claims.
//!
//! An admin token is an HS256 JWT whose `role` claim is `admin`. Tokens are
//! minted out of band with the shared `ROSTER_ADMIN_SECRET`.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    /// Who the token was issued to.
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct AdminVerifier {
    decoding_key: DecodingKey,
}

impl AdminVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Verify signature, expiry and role.
    pub fn verify(&self, token: &str) -> Result<AdminClaims, AppError> {
        let data = decode::<AdminClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Admin token expired".to_string())
                }
                _ => {
                    tracing::warn!("Rejected admin token: {}", e);
                    AppError::Unauthorized("Invalid admin token".to_string())
                }
            })?;

        if data.claims.role != ADMIN_ROLE {
            return Err(AppError::Forbidden("Token does not carry the admin role".to_string()));
        }
        Ok(data.claims)
    }
}

/// Mint an admin token.
#[cfg(test)]
pub fn issue_admin_token(secret: &str, subject: &str, role: &str, ttl_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = chrono::Utc::now().timestamp();
    let claims = AdminClaims {
        sub: subject.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
