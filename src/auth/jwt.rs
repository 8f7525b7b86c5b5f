//! JWT issuance and verification.
//!
//! HS256, matching the donor's signing choice. Claims carry the role and a
//! `jti_version` snapshot instead of the donor's bare `jti` string: revocation
//! is "every token issued before the user's current `jti_version`", checked
//! by comparing this claim against `users.jti_version` on each use (replaces
//! the donor's Redis-backed revoked-token set — §9 decision).

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Role, User};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    pub tag: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
    /// The user's `jti_version` at issuance time.
    pub jti: i32,
}

impl Claims {
    pub fn user_id(&self) -> Uuid {
        // Infallible by construction: `sub` is always written from a Uuid in `issue`.
        self.sub.parse().expect("claims.sub is always a valid uuid")
    }

    pub fn jti_version(&self) -> i32 {
        self.jti
    }
}

pub fn issue(user: &User, secret: &str, ttl_seconds: i64) -> Result<String, AppError> {
    validate_secret(secret)?;

    let now = Utc::now();
    let claims = Claims {
        sub: user.id.to_string(),
        tag: user.tag.clone(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
        jti: user.jti_version,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AppError::from)
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

pub fn validate_secret(secret: &str) -> Result<(), AppError> {
    if secret.len() < 32 {
        return Err(AppError::Internal(
            "JWT_SECRET must be at least 32 characters for security".into(),
        ));
    }
    Ok(())
}
