use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{FirstRoundStrategy, TournamentStatus, TournamentType};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tournament {
    pub id: Uuid,
    pub name: String,
    pub creator_id: Uuid,
    #[sqlx(rename = "type_")]
    pub kind: TournamentType,
    pub capacity: i32,
    pub total_rounds: i32,
    pub current_round: i32,
    pub regular_rounds: i32,
    pub status: TournamentStatus,
    pub first_round_strategy: FirstRoundStrategy,
    pub with_finals: bool,
    pub finals_started: bool,
    pub finals_games_count: Option<i32>,
    pub finals_participants_count: Option<i32>,
    /// Per-tournament override of the lobby-maker priority list (§4.3).
    pub lobby_maker_priority_list: Vec<Uuid>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tournament {
    pub fn games_per_round(&self) -> i32 {
        self.capacity / 8
    }

    pub fn finals_games_per_round(&self) -> i32 {
        self.finals_participants_count.unwrap_or(0) / 8
    }

    pub fn is_finals_round(&self, round_number: i32) -> bool {
        round_number > self.regular_rounds
    }
}
