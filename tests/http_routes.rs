// Convenience test entry exposing per-route integration tests.
// Run with: `cargo test --test http_routes`

#[path = "common/mod.rs"]
mod common;

#[path = "http_routes/tournament_lifecycle.rs"]
mod tournament_lifecycle;

#[path = "http_routes/results.rs"]
mod results;

#[path = "http_routes/lobby_maker.rs"]
mod lobby_maker;

#[path = "http_routes/authz.rs"]
mod authz;
