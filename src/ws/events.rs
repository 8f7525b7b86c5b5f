//! Event catalogue (SPEC_FULL.md §4.9). Every variant carries `type` (via
//! serde's internally-tagged representation) and `timestamp`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Hello {
        user_id: Uuid,
        active_tournament_ids: Vec<Uuid>,
        timestamp: DateTime<Utc>,
    },
    Error {
        error_type: String,
        message: String,
        timestamp: DateTime<Utc>,
    },
    TournamentStarted {
        tournament_id: Uuid,
        current_round: i32,
        title: String,
        priority: &'static str,
        timestamp: DateTime<Utc>,
    },
    NextRoundCreated {
        tournament_id: Uuid,
        round_number: i32,
        is_final: bool,
        final_round_number: Option<i32>,
        force_reload: bool,
        timestamp: DateTime<Utc>,
    },
    FinalsStarted {
        tournament_id: Uuid,
        finalists_count: i32,
        timestamp: DateTime<Utc>,
    },
    TournamentFinished {
        tournament_id: Uuid,
        force_reload: bool,
        timestamp: DateTime<Utc>,
    },
    GameResultUpdated {
        tournament_id: Uuid,
        game_id: Uuid,
        round_number: i32,
        is_final: bool,
        participant_id: Uuid,
        positions: Option<Vec<i32>>,
        calculated_points: Option<f64>,
        is_lobby_maker: bool,
        game_status: String,
        timestamp: DateTime<Utc>,
    },
    GameCompleted {
        tournament_id: Uuid,
        game_id: Uuid,
        round_number: i32,
        is_final: bool,
        timestamp: DateTime<Utc>,
    },
    PositionUpdated {
        tournament_id: Uuid,
        participant_id: Uuid,
        user_id: Uuid,
        total_score: f64,
        finals_score: Option<f64>,
        final_position: Option<i32>,
        timestamp: DateTime<Utc>,
    },
    LobbyMakerAssigned {
        tournament_id: Uuid,
        game_id: Uuid,
        round_number: i32,
        lobby_maker_user_id: Option<Uuid>,
        lobby_maker_tag: Option<String>,
        timestamp: DateTime<Utc>,
    },
    LobbyMakerRemoved {
        tournament_id: Uuid,
        game_id: Uuid,
        round_number: i32,
        lobby_maker_user_id: Option<Uuid>,
        lobby_maker_tag: Option<String>,
        timestamp: DateTime<Utc>,
    },
}
