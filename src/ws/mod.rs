// WebSocket entry points and helpers
pub mod core;
pub mod events;
pub mod handler;
pub mod routes;

pub use routes::create_ws_routes;
