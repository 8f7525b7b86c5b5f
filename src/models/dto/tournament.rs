use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::FirstRoundStrategy;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentRequest {
    pub name: String,
    pub capacity: i32,
    pub total_rounds: i32,
    #[serde(default)]
    pub first_round_strategy: FirstRoundStrategy,
    #[serde(default)]
    pub with_finals: bool,
    pub finals_games_count: Option<i32>,
    pub finals_participants_count: Option<i32>,
    #[serde(default)]
    pub lobby_maker_priority_list: Vec<Uuid>,
    pub registration_deadline: Option<DateTime<Utc>>,
}

/// Structural fields only mutable while `status = registration` (§3).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTournamentRequest {
    pub name: Option<String>,
    pub capacity: Option<i32>,
    pub total_rounds: Option<i32>,
    pub first_round_strategy: Option<FirstRoundStrategy>,
    pub lobby_maker_priority_list: Option<Vec<Uuid>>,
    pub registration_deadline: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct TournamentListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalistSwapRequest {
    pub from_participant_id: Uuid,
    pub to_participant_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantSwapRequest {
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyMakerAssignRequest {
    pub user_id: Uuid,
}
