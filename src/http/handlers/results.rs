//! Result ingest: single-slot, batch, and clear (SPEC_FULL.md §4.5, §6).
//!
//! Every handler locks the game row `FOR UPDATE` before validating, so two
//! concurrent submissions for the same game serialize instead of racing on
//! the cross-slot conflict check.

use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::game::GameRepository;
use crate::db::game_participant::GameParticipantRepository;
use crate::db::participant::ParticipantRepository;
use crate::db::round::RoundRepository;
use crate::db::tournament::TournamentRepository;
use crate::domain::authz;
use crate::domain::audit::ActionType;
use crate::domain::{results, scoring};
use crate::errors::AppError;
use crate::models::GameStatus;
use crate::models::dto::game::{BatchPositionRequest, SetPositionRequest};
use crate::state::AppState;
use crate::ws::core::manager;
use crate::ws::events::Event;

use super::tournament::write_log;

async fn game_context(
    conn: &mut sqlx::PgConnection,
    games: &GameRepository,
    tournaments: &TournamentRepository,
    game_id: Uuid,
) -> Result<(crate::models::Game, crate::models::Tournament), AppError> {
    let game = games.lock_for_update(conn, game_id).await?;
    let tournament = tournaments.find_by_id(game.tournament_id).await?;
    Ok((game, tournament))
}

fn require_seated(
    slots: &[crate::models::GameParticipant],
    participant_id: Uuid,
) -> Result<(), AppError> {
    if slots.iter().any(|s| s.participant_id == participant_id) {
        Ok(())
    } else {
        Err(AppError::NotFound(
            "participant does not hold a slot in this game".into(),
        ))
    }
}

async fn participant_user_ids(
    conn: &mut sqlx::PgConnection,
    participants: &ParticipantRepository,
    slots: &[crate::models::GameParticipant],
) -> Result<Vec<Uuid>, AppError> {
    let mut ids = Vec::with_capacity(slots.len());
    for slot in slots {
        ids.push(participants.find_by_id_tx(conn, slot.participant_id).await?.user_id);
    }
    Ok(ids)
}

async fn recompute_and_store_scores(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    game_participants: &GameParticipantRepository,
    participants: &ParticipantRepository,
    participant_id: Uuid,
    regular_rounds: i32,
) -> Result<(f64, f64), AppError> {
    let scored = game_participants
        .scored_slots_for_participant(tx, participant_id)
        .await?;
    let scored_slots: Vec<results::ScoredSlot> = scored
        .into_iter()
        .map(|(round_number, calculated_points)| results::ScoredSlot {
            round_number,
            calculated_points,
        })
        .collect();
    let (total_score, finals_score) = results::recompute_scores(&scored_slots, regular_rounds);
    participants
        .update_scores(tx, participant_id, total_score, finals_score)
        .await?;
    Ok((total_score, finals_score))
}

pub async fn set_position(
    State(state): State<AppState>,
    Path((game_id, participant_id)): Path<(Uuid, Uuid)>,
    actor: AuthUser,
    Json(positions): Json<SetPositionRequest>,
) -> Result<(), AppError> {
    let games = GameRepository::new(state.db.clone());
    let tournaments = TournamentRepository::new(state.db.clone());
    let game_participants = GameParticipantRepository::new();
    let participants = ParticipantRepository::new(state.db.clone());
    let rounds = RoundRepository::new(state.db.clone());

    let mut tx = state.db.begin().await?;
    let (game, tournament) = game_context(&mut tx, &games, &tournaments, game_id).await?;

    let slots = game_participants.list_by_game(&mut tx, game_id).await?;
    let seated_user_ids = participant_user_ids(&mut tx, &participants, &slots).await?;
    if !authz::can_submit_result(
        actor.user_id,
        actor.role,
        tournament.creator_id,
        &seated_user_ids,
        game.lobby_maker_user_id,
    ) {
        return Err(AppError::Unauthorized(
            "not permitted to submit a result for this game".into(),
        ));
    }

    require_seated(&slots, participant_id)?;

    let sorted = results::validate_positions(&positions)?;
    let other = game_participants
        .other_positions(&mut tx, game_id, participant_id)
        .await?;
    results::check_conflicts(&sorted, &other)?;
    let calculated_points = scoring::points(&sorted)?;

    game_participants
        .set_result(&mut tx, game_id, participant_id, &sorted, calculated_points)
        .await?;

    let slot_count = slots.len() as i64;
    let filled = game_participants.count_results(&mut tx, game_id).await?;
    let now_complete = filled >= slot_count;
    if now_complete {
        games.set_status(&mut tx, game_id, GameStatus::Completed).await?;
    }

    let (total_score, finals_score) = recompute_and_store_scores(
        &mut tx,
        &game_participants,
        &participants,
        participant_id,
        tournament.regular_rounds,
    )
    .await?;

    write_log(
        &mut tx,
        tournament.id,
        Some(game_id),
        &actor,
        ActionType::ResultSubmitted,
        format!("{} submitted a result for game {}", actor.tag, game_id),
    )
    .await?;

    tx.commit().await?;

    let round = rounds.find_by_id(game.round_id).await?;
    let is_final = tournament.is_finals_round(round.round_number);
    let participant_user_id = participants.find_by_id(participant_id).await?.user_id;

    manager::broadcast_to_tournament(
        &state,
        &participants,
        tournament.id,
        &Event::GameResultUpdated {
            tournament_id: tournament.id,
            game_id,
            round_number: round.round_number,
            is_final,
            participant_id,
            positions: Some(sorted.clone()),
            calculated_points: Some(calculated_points),
            is_lobby_maker: game.lobby_maker_user_id == Some(participant_user_id),
            game_status: if now_complete { "completed".into() } else { "active".into() },
            timestamp: chrono::Utc::now(),
        },
    )
    .await
    .ok();
    manager::broadcast_to_tournament(
        &state,
        &participants,
        tournament.id,
        &Event::PositionUpdated {
            tournament_id: tournament.id,
            participant_id,
            user_id: participant_user_id,
            total_score,
            finals_score: Some(finals_score),
            final_position: None,
            timestamp: chrono::Utc::now(),
        },
    )
    .await
    .ok();
    if now_complete {
        manager::broadcast_to_tournament(
            &state,
            &participants,
            tournament.id,
            &Event::GameCompleted {
                tournament_id: tournament.id,
                game_id,
                round_number: round.round_number,
                is_final,
                timestamp: chrono::Utc::now(),
            },
        )
        .await
        .ok();
    }

    Ok(())
}

pub async fn set_positions_batch(
    State(state): State<AppState>,
    Path(game_id): Path<Uuid>,
    actor: AuthUser,
    Json(entries): Json<BatchPositionRequest>,
) -> Result<(), AppError> {
    let games = GameRepository::new(state.db.clone());
    let tournaments = TournamentRepository::new(state.db.clone());
    let game_participants = GameParticipantRepository::new();
    let participants = ParticipantRepository::new(state.db.clone());
    let rounds = RoundRepository::new(state.db.clone());

    let mut tx = state.db.begin().await?;
    let (game, tournament) = game_context(&mut tx, &games, &tournaments, game_id).await?;

    let slots = game_participants.list_by_game(&mut tx, game_id).await?;
    let seated_user_ids = participant_user_ids(&mut tx, &participants, &slots).await?;
    if !authz::can_submit_result(
        actor.user_id,
        actor.role,
        tournament.creator_id,
        &seated_user_ids,
        game.lobby_maker_user_id,
    ) {
        return Err(AppError::Unauthorized(
            "not permitted to submit results for this game".into(),
        ));
    }

    let raw_entries: Vec<(Uuid, &[i32])> = entries
        .iter()
        .map(|e| (e.participant_id, e.positions.as_slice()))
        .collect();
    let validated = results::validate_batch(raw_entries)?;

    // Slots left untouched by this batch: their stored positions are
    // authoritative for the conflict check. Slots the batch itself is
    // rewriting are excluded here, since `validate_batch` already checked
    // them against each other; otherwise a batch reassigning positions among
    // its own entries (e.g. A:[1]->[2], B:[2]->[1]) would spuriously
    // conflict against its own pre-batch values.
    for (participant_id, _) in &validated {
        require_seated(&slots, *participant_id)?;
    }

    let batch_participant_ids: std::collections::HashSet<Uuid> =
        validated.iter().map(|(id, _)| *id).collect();
    let untouched_positions: Vec<Vec<i32>> = slots
        .iter()
        .filter(|s| !batch_participant_ids.contains(&s.participant_id))
        .filter_map(|s| s.positions.clone())
        .collect();

    for (participant_id, positions) in &validated {
        results::check_conflicts(positions, &untouched_positions)?;
        let calculated_points = scoring::points(positions)?;
        game_participants
            .set_result(&mut tx, game_id, *participant_id, positions, calculated_points)
            .await?;
    }

    let slot_count = slots.len() as i64;
    let filled = game_participants.count_results(&mut tx, game_id).await?;
    let now_complete = filled >= slot_count;
    if now_complete {
        games.set_status(&mut tx, game_id, GameStatus::Completed).await?;
    }

    for (participant_id, _) in &validated {
        recompute_and_store_scores(
            &mut tx,
            &game_participants,
            &participants,
            *participant_id,
            tournament.regular_rounds,
        )
        .await?;
    }

    write_log(
        &mut tx,
        tournament.id,
        Some(game_id),
        &actor,
        ActionType::ResultSubmitted,
        format!(
            "{} submitted a batch of {} results for game {}",
            actor.tag,
            validated.len(),
            game_id
        ),
    )
    .await?;

    tx.commit().await?;

    if now_complete {
        let round = rounds.find_by_id(game.round_id).await?;
        manager::broadcast_to_tournament(
            &state,
            &participants,
            tournament.id,
            &Event::GameCompleted {
                tournament_id: tournament.id,
                game_id,
                round_number: round.round_number,
                is_final: tournament.is_finals_round(round.round_number),
                timestamp: chrono::Utc::now(),
            },
        )
        .await
        .ok();
    }

    Ok(())
}

pub async fn clear_result(
    State(state): State<AppState>,
    Path((game_id, participant_id)): Path<(Uuid, Uuid)>,
    actor: AuthUser,
) -> Result<(), AppError> {
    let games = GameRepository::new(state.db.clone());
    let tournaments = TournamentRepository::new(state.db.clone());
    let game_participants = GameParticipantRepository::new();
    let participants = ParticipantRepository::new(state.db.clone());

    let mut tx = state.db.begin().await?;
    let (game, tournament) = game_context(&mut tx, &games, &tournaments, game_id).await?;

    let round = RoundRepository::new(state.db.clone())
        .find_by_id(game.round_id)
        .await?;
    if round.status == crate::models::RoundStatus::Completed {
        return Err(AppError::InvalidState(
            "cannot clear a result once its round has completed".into(),
        ));
    }

    let slots = game_participants.list_by_game(&mut tx, game_id).await?;
    let seated_user_ids = participant_user_ids(&mut tx, &participants, &slots).await?;
    if !authz::can_clear_result(
        actor.user_id,
        actor.role,
        tournament.creator_id,
        &seated_user_ids,
        game.lobby_maker_user_id,
    ) {
        return Err(AppError::Unauthorized(
            "not permitted to clear a result for this game".into(),
        ));
    }

    require_seated(&slots, participant_id)?;

    game_participants.clear_result(&mut tx, game_id, participant_id).await?;
    if game.status == GameStatus::Completed {
        games.set_status(&mut tx, game_id, GameStatus::Active).await?;
    }

    recompute_and_store_scores(
        &mut tx,
        &game_participants,
        &participants,
        participant_id,
        tournament.regular_rounds,
    )
    .await?;

    write_log(
        &mut tx,
        tournament.id,
        Some(game_id),
        &actor,
        ActionType::ResultCleared,
        format!("{} cleared a result for game {}", actor.tag, game_id),
    )
    .await?;

    tx.commit().await?;
    Ok(())
}
