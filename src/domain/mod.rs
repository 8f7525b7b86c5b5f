//! The tournament progression and scoring engine (SPEC_FULL.md §4).
//!
//! Every module here is invoked only from `http::handlers`, each call wrapped
//! in one DB transaction per §5's concurrency model. Nothing in this module
//! talks to the network directly — notification dispatch is the caller's job,
//! always performed strictly after commit (§4.9, §9).

pub mod audit;
pub mod authz;
pub mod finals;
pub mod heartbeat;
pub mod lobby_maker;
pub mod pairing;
pub mod ranker;
pub mod results;
pub mod scoring;
pub mod state_machine;
