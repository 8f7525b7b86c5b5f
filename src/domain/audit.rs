//! Audit log (SPEC_FULL.md §4.10).
//!
//! Every mutating state-machine transition and every result/lobby-maker
//! change writes one append-only record before its transaction commits.
//! This module only builds the record; `db::log` performs the insert inside
//! the caller's transaction.

use chrono::Utc;
use uuid::Uuid;

use crate::models::{LogRecord, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    TournamentStarted,
    RoundAdvanced,
    FinalsStarted,
    TournamentFinished,
    TournamentCancelled,
    ResultSubmitted,
    ResultCleared,
    LobbyMakerAssigned,
    LobbyMakerRemoved,
    ParticipantJoined,
    ParticipantLeft,
    ParticipantSwapped,
    FinalistSwapped,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::TournamentStarted => "tournament_started",
            ActionType::RoundAdvanced => "round_advanced",
            ActionType::FinalsStarted => "finals_started",
            ActionType::TournamentFinished => "tournament_finished",
            ActionType::TournamentCancelled => "tournament_cancelled",
            ActionType::ResultSubmitted => "result_submitted",
            ActionType::ResultCleared => "result_cleared",
            ActionType::LobbyMakerAssigned => "lobby_maker_assigned",
            ActionType::LobbyMakerRemoved => "lobby_maker_removed",
            ActionType::ParticipantJoined => "participant_joined",
            ActionType::ParticipantLeft => "participant_left",
            ActionType::ParticipantSwapped => "participant_swapped",
            ActionType::FinalistSwapped => "finalist_swapped",
        }
    }
}

/// Builds an in-memory `LogRecord` snapshotting the actor's tag and role at
/// write time, ready for `db::log::LogRepository::insert` within the
/// caller's open transaction. `id` and `created_at` are filled by the
/// database default; the zero/epoch placeholders here are overwritten on
/// insert and never read back.
pub fn build_record(
    tournament_id: Uuid,
    game_id: Option<Uuid>,
    actor_user_id: Uuid,
    actor_tag_snapshot: String,
    actor_role_snapshot: Role,
    action_type: ActionType,
    description: String,
) -> LogRecord {
    LogRecord {
        id: Uuid::new_v4(),
        tournament_id,
        game_id,
        actor_user_id,
        actor_tag_snapshot,
        actor_role_snapshot,
        action_type: action_type.as_str().to_string(),
        description,
        created_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_record_snapshots_actor_fields() {
        let tid = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let record = build_record(
            tid,
            None,
            actor,
            "some_tag".into(),
            Role::Admin,
            ActionType::TournamentStarted,
            "tournament started".into(),
        );
        assert_eq!(record.tournament_id, tid);
        assert_eq!(record.actor_user_id, actor);
        assert_eq!(record.action_type, "tournament_started");
    }
}
