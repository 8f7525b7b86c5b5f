use axum::{Router, routing::get};

use crate::state::AppState;
use crate::ws::handler::ws_upgrade;

/// The universal per-user duplex event stream: `GET /ws?token=…` (§4.9, §6).
pub fn create_ws_routes(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_upgrade))
        .with_state(state)
}
