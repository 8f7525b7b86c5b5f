//! Domain models, organized one file per aggregate root.
//!
//! Each struct derives `sqlx::FromRow` for direct row mapping and `Serialize`
//! for use as an HTTP response body; request DTOs live in `dto`.

pub mod dto;
pub mod enums;
pub mod game;
pub mod game_participant;
pub mod log;
pub mod participant;
pub mod round;
pub mod tournament;
pub mod user;

pub use enums::*;
pub use game::Game;
pub use game_participant::GameParticipant;
pub use log::LogRecord;
pub use participant::Participant;
pub use round::Round;
pub use tournament::Tournament;
pub use user::User;
