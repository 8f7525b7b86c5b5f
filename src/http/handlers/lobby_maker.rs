//! Manual lobby-maker (re)assignment and removal (SPEC_FULL.md §4.3, §6).

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::game::GameRepository;
use crate::db::game_participant::GameParticipantRepository;
use crate::db::participant::ParticipantRepository;
use crate::db::tournament::TournamentRepository;
use crate::domain::audit::ActionType;
use crate::domain::authz::{self, StructuralAction};
use crate::domain::lobby_maker;
use crate::errors::AppError;
use crate::models::dto::tournament::LobbyMakerAssignRequest;
use crate::state::AppState;
use crate::ws::core::manager;
use crate::ws::events::Event;

use super::tournament::write_log;

pub async fn assign(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    actor: AuthUser,
    Json(req): Json<LobbyMakerAssignRequest>,
) -> Result<(), AppError> {
    let games = GameRepository::new(state.db.clone());
    let tournaments = TournamentRepository::new(state.db.clone());
    let game_participants = GameParticipantRepository::new();
    let participants = ParticipantRepository::new(state.db.clone());

    let mut tx = state.db.begin().await?;
    let game = games.lock_for_update(&mut tx, game_id).await?;
    let tournament = tournaments.find_by_id(game.tournament_id).await?;

    if !authz::can_perform_structural(
        StructuralAction::AssignLobbyMaker,
        actor.role,
        actor.user_id == tournament.creator_id,
    ) {
        return Err(AppError::Unauthorized(
            "not permitted to assign this game's lobby maker".into(),
        ));
    }

    let slots = game_participants.list_by_game(&mut tx, game_id).await?;
    let mut candidate_participant_id = None;
    for slot in &slots {
        let p = participants.find_by_id_tx(&mut tx, slot.participant_id).await?;
        if p.user_id == req.user_id {
            candidate_participant_id = Some(slot.participant_id);
        }
    }
    let results_count = game_participants.count_results(&mut tx, game_id).await?;
    let candidate_in_game = candidate_participant_id.is_some();
    if !lobby_maker::can_assign(results_count > 0, candidate_in_game) {
        return Err(AppError::InvalidState(
            "lobby maker can only be (re)assigned to a seated participant before any result is submitted"
                .into(),
        ));
    }
    let candidate_participant_id = candidate_participant_id.unwrap();

    game_participants.clear_lobby_maker_flags(&mut tx, game_id).await?;
    game_participants
        .set_lobby_maker_flag(&mut tx, game_id, candidate_participant_id)
        .await?;
    games.set_lobby_maker(&mut tx, game_id, Some(req.user_id)).await?;

    write_log(
        &mut tx,
        tournament.id,
        Some(game_id),
        &actor,
        ActionType::LobbyMakerAssigned,
        format!("{} assigned lobby maker for game {}", actor.tag, game_id),
    )
    .await?;

    tx.commit().await?;

    let round = crate::db::round::RoundRepository::new(state.db.clone())
        .find_by_id(game.round_id)
        .await?;
    manager::broadcast_to_tournament(
        &state,
        &participants,
        tournament.id,
        &Event::LobbyMakerAssigned {
            tournament_id: tournament.id,
            game_id,
            round_number: round.round_number,
            lobby_maker_user_id: Some(req.user_id),
            lobby_maker_tag: None,
            timestamp: chrono::Utc::now(),
        },
    )
    .await
    .ok();

    Ok(())
}

pub async fn remove(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    actor: AuthUser,
) -> Result<(), AppError> {
    let games = GameRepository::new(state.db.clone());
    let tournaments = TournamentRepository::new(state.db.clone());
    let game_participants = GameParticipantRepository::new();
    let participants = ParticipantRepository::new(state.db.clone());

    let mut tx = state.db.begin().await?;
    let game = games.lock_for_update(&mut tx, game_id).await?;
    let tournament = tournaments.find_by_id(game.tournament_id).await?;

    if !authz::can_perform_structural(
        StructuralAction::RemoveLobbyMaker,
        actor.role,
        actor.user_id == tournament.creator_id,
    ) {
        return Err(AppError::Unauthorized(
            "not permitted to remove this game's lobby maker".into(),
        ));
    }

    let results_count = game_participants.count_results(&mut tx, game_id).await?;
    if !lobby_maker::can_remove(results_count > 0) {
        return Err(AppError::InvalidState(
            "lobby maker cannot be removed once a result has been submitted".into(),
        ));
    }

    game_participants.clear_lobby_maker_flags(&mut tx, game_id).await?;
    games.set_lobby_maker(&mut tx, game_id, None).await?;

    write_log(
        &mut tx,
        tournament.id,
        Some(game_id),
        &actor,
        ActionType::LobbyMakerRemoved,
        format!("{} removed lobby maker for game {}", actor.tag, game_id),
    )
    .await?;

    tx.commit().await?;

    let round = crate::db::round::RoundRepository::new(state.db.clone())
        .find_by_id(game.round_id)
        .await?;
    manager::broadcast_to_tournament(
        &state,
        &participants,
        tournament.id,
        &Event::LobbyMakerRemoved {
            tournament_id: tournament.id,
            game_id,
            round_number: round.round_number,
            lobby_maker_user_id: None,
            lobby_maker_tag: None,
            timestamp: chrono::Utc::now(),
        },
    )
    .await
    .ok();

    Ok(())
}
