//! OAuth callback and current-user endpoints (SPEC_FULL.md §6, §9).

use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

use crate::auth::{self, AuthUser};
use crate::db::user::UserRepository;
use crate::errors::AppError;
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: String,
}

/// Exchanges the provider's authorization code, upserts the local user
/// record, issues a JWT, and redirects to the configured frontend with the
/// token in the fragment so it never reaches server logs.
pub async fn callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> Result<Redirect, AppError> {
    let identity = auth::oauth::exchange_code(&state.http_client, &state.config, &query.code).await?;

    let users = UserRepository::new(state.db.clone());
    let user = users
        .upsert_from_oauth(&identity.external_id, &identity.tag, &identity.display_name)
        .await?;

    let token = auth::issue_jwt(&user, &state.config.jwt_secret, state.config.jwt_ttl_seconds)?;

    Ok(Redirect::to(&format!(
        "{}#token={}",
        state.config.frontend_base_url, token
    )))
}

pub async fn me(State(state): State<AppState>, actor: AuthUser) -> Result<Json<User>, AppError> {
    let users = UserRepository::new(state.db.clone());
    let user = users.find_by_id(actor.user_id).await?;
    Ok(Json(user))
}

/// Bumps `jti_version`, invalidating every token issued before now (§9).
pub async fn logout(State(state): State<AppState>, actor: AuthUser) -> Result<(), AppError> {
    let users = UserRepository::new(state.db.clone());
    users.bump_jti_version(actor.user_id).await?;
    Ok(())
}
