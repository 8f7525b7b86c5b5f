//! HTTP layer.
//!
//! - `handlers` contains request handlers grouped by aggregate
//!   (`tournament`, `results`, `lobby_maker`, `auth`). Handlers are small
//!   adapters over the repository layer under `src/db/` and the pure rules
//!   under `src/domain/`.
//! - `routes` composes handlers into route groups (public, api, auth) and
//!   exposes `create_http_routes(state)`.
pub mod handlers;
pub mod routes;

pub use routes::create_http_routes;
