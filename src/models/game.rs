use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::GameStatus;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Game {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub round_id: Uuid,
    pub game_number: i32,
    pub status: GameStatus,
    pub lobby_maker_user_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}
