//! Request/response DTOs — the shapes the HTTP layer speaks, distinct from the
//! persisted models in the parent module.

pub mod game;
pub mod pagination;
pub mod tournament;

pub use pagination::PageQuery;
