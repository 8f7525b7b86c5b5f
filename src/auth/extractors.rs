use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use axum_extra::TypedHeader;
use headers::{Authorization, authorization::Bearer};
use uuid::Uuid;

use crate::models::Role;
use crate::state::AppState;

use super::jwt::decode_token;

/// The authenticated actor for a request: identity and role as of the
/// moment the bearer token's `jti_version` was last checked against the
/// database (§9: Postgres is the sole revocation source of truth).
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub tag: String,
    pub role: Role,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    (
                        StatusCode::UNAUTHORIZED,
                        "missing or invalid Authorization header".into(),
                    )
                })?;

        let claims = decode_token(bearer.token(), &state.config.jwt_secret).map_err(|e| {
            tracing::warn!("JWT validation failed: {}", e);
            (StatusCode::UNAUTHORIZED, "invalid or expired token".into())
        })?;

        let current_jti_version: i32 =
            sqlx::query_scalar("SELECT jti_version FROM users WHERE id = $1 AND active")
                .bind(claims.user_id())
                .fetch_optional(&state.db)
                .await
                .map_err(|_| {
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "failed to verify session".into(),
                    )
                })?
                .ok_or((StatusCode::UNAUTHORIZED, "user not found or inactive".into()))?;

        if current_jti_version != claims.jti_version() {
            return Err((StatusCode::UNAUTHORIZED, "token has been revoked".into()));
        }

        Ok(AuthUser {
            user_id: claims.user_id(),
            tag: claims.tag,
            role: claims.role,
        })
    }
}
