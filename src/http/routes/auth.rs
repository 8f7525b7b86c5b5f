//! Authenticated routes: strict rate limit (`AuthRateLimit`), activity
//! heartbeat layered on top so every authenticated call refreshes
//! `users.last_seen` (§4.11) regardless of which handler it reaches.

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};

use crate::http::handlers::{auth as auth_handlers, lobby_maker, results, tournament};
use crate::middleware::{self, AuthRateLimit, rate_limit_middleware};
use crate::state::AppState;

/// Takes `state` so `activity_heartbeat` — a `State<AppState>`-extracting
/// middleware — can be bound with a concrete value via `from_fn_with_state`
/// here, ahead of the top-level `.with_state()` call in `create_http_routes`
/// that erases the router's state type.
pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/callback", get(auth_handlers::callback))
        .route("/me", get(auth_handlers::me))
        .route("/logout", post(auth_handlers::logout))
        .route("/tournaments", post(tournament::create))
        .route(
            "/tournaments/{id}",
            put(tournament::update).delete(tournament::delete),
        )
        .route("/tournaments/{id}/join", post(tournament::join))
        .route("/tournaments/{id}/leave", post(tournament::leave))
        .route("/tournaments/{id}/start", post(tournament::start))
        .route("/tournaments/{id}/next-round", post(tournament::next_round))
        .route("/tournaments/{id}/start-finals", post(tournament::start_finals))
        .route("/tournaments/{id}/finish", post(tournament::finish))
        .route("/tournaments/{id}/finals/swap", post(tournament::finals_swap))
        .route(
            "/tournaments/{id}/participants/swap",
            post(tournament::swap_participant),
        )
        .route("/tournaments/{id}/logs", get(tournament::logs))
        .route(
            "/games/{game_id}/participants/{participant_id}/position",
            put(results::set_position).delete(results::clear_result),
        )
        .route("/games/{game_id}/positions/batch", post(results::set_positions_batch))
        .route(
            "/games/{game_id}/lobby-maker",
            post(lobby_maker::assign).delete(lobby_maker::remove),
        )
        .layer(axum_middleware::from_fn(rate_limit_middleware::<AuthRateLimit>))
        .layer(axum_middleware::from_fn_with_state(
            state,
            middleware::activity_heartbeat,
        ))
}
