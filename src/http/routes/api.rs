//! Read routes: moderate rate limit (`ApiRateLimit`), no auth required.
//!
//! Tournament detail reads include PII-bearing fields nowhere — the DTOs
//! returned here are participant/tournament shape only; anything gated by
//! `domain::authz::can_read_pii` is served from the `auth`-tier routes instead.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::get,
};

use crate::http::handlers::tournament;
use crate::middleware::{ApiRateLimit, rate_limit_middleware};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tournaments", get(tournament::list))
        .route("/tournaments/{id}", get(tournament::get))
        .route(
            "/tournaments/{id}/rounds/{round_number}/games",
            get(tournament::round_games),
        )
        .route(
            "/tournaments/{id}/finals/leaderboard",
            get(tournament::finals_leaderboard),
        )
        .layer(axum_middleware::from_fn(rate_limit_middleware::<ApiRateLimit>))
}
