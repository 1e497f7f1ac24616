use axum::http::{HeaderMap, header};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, presentation::http::errors::AppError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// WeChat openid.
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
}

pub fn issue_user_token(config: &Config, user_id: &str) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let claims = UserClaims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(config.jwt_expire_hours)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

pub fn decode_user_claims(token: &str, secret: &str) -> Result<UserClaims, AppError> {
    decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|d| d.claims)
    .map_err(|e| AppError::Forbidden(format!("invalid token: {}", e)))
}

/// Checks that the caller may act as `user_id`.
///
/// A bearer token, when present, must be valid and issued to `user_id`. Without
/// one the request passes unless `REQUIRE_AUTH` is set.
pub fn ensure_caller(headers: &HeaderMap, config: &Config, user_id: &str) -> Result<(), AppError> {
    match extract_bearer_token(headers) {
        Some(token) => {
            let claims = decode_user_claims(&token, &config.jwt_secret)?;
            if claims.sub != user_id {
                return Err(AppError::Forbidden(format!(
                    "token subject does not match user_id {}",
                    user_id
                )));
            }
            Ok(())
        }
        None if config.require_auth => Err(AppError::Forbidden("missing bearer token".into())),
        None => Ok(()),
    }
}
