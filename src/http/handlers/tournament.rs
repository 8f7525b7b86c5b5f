//! Tournament lifecycle, round/pairing orchestration, and finals handlers
//! (SPEC_FULL.md §4.4, §4.6, §4.7, §6).
//!
//! Every handler here follows the same shape: extract → open a transaction
//! → lock the tournament row (`FOR UPDATE`, §5) → check preconditions and
//! authorization → mutate → write an audit log record → commit → dispatch
//! notifications. Notifications are always built from already-committed
//! facts and sent strictly after `tx.commit()` returns (§4.9, §9).

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::game::GameRepository;
use crate::db::game_participant::GameParticipantRepository;
use crate::db::log::LogRepository;
use crate::db::participant::ParticipantRepository;
use crate::db::round::RoundRepository;
use crate::db::tournament::TournamentRepository;
use crate::db::user::UserRepository;
use crate::domain::authz::{self, StructuralAction};
use crate::domain::audit::{self, ActionType};
use crate::domain::{finals, lobby_maker, pairing, state_machine};
use crate::errors::AppError;
use crate::models::dto::pagination::PageQuery;
use crate::models::dto::tournament::{
    CreateTournamentRequest, FinalistSwapRequest, ParticipantSwapRequest,
    TournamentListQuery, UpdateTournamentRequest,
};
use crate::models::{Participant, Round, Tournament, TournamentStatus};
use crate::state::AppState;
use crate::ws::core::manager;
use crate::ws::events::Event;

pub async fn create(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(req): Json<CreateTournamentRequest>,
) -> Result<Json<Tournament>, AppError> {
    if req.capacity % 8 != 0 || !(8..=128).contains(&req.capacity) {
        return Err(AppError::Invalid(
            "capacity must be a multiple of 8 between 8 and 128".into(),
        ));
    }
    if req.total_rounds < 1 {
        return Err(AppError::Invalid("total_rounds must be at least 1".into()));
    }
    if req.with_finals {
        let n = req.finals_participants_count.unwrap_or(0);
        if n != 8 && n != 16 {
            return Err(AppError::Invalid(
                "finals_participants_count must be 8 or 16 when with_finals".into(),
            ));
        }
        if req.finals_games_count.unwrap_or(0) < 1 {
            return Err(AppError::Invalid(
                "finals_games_count must be at least 1 when with_finals".into(),
            ));
        }
    }

    let tournaments = TournamentRepository::new(state.db.clone());
    let tournament = tournaments
        .create(
            actor.user_id,
            &req.name,
            req.capacity,
            req.total_rounds,
            req.first_round_strategy,
            req.with_finals,
            req.finals_games_count,
            req.finals_participants_count,
            &req.lobby_maker_priority_list,
            req.registration_deadline,
        )
        .await?;

    Ok(Json(tournament))
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<TournamentListQuery>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<Tournament>>, AppError> {
    let status = filter
        .status
        .map(|s| match s.as_str() {
            "registration" => Ok(TournamentStatus::Registration),
            "active" => Ok(TournamentStatus::Active),
            "finished" => Ok(TournamentStatus::Finished),
            "cancelled" => Ok(TournamentStatus::Cancelled),
            other => Err(AppError::Invalid(format!("unknown status filter {other}"))),
        })
        .transpose()?;

    let tournaments = TournamentRepository::new(state.db.clone());
    let rows = tournaments.list(status, page.limit(), page.offset()).await?;
    Ok(Json(rows))
}

#[derive(Debug, serde::Serialize)]
pub struct TournamentDetail {
    #[serde(flatten)]
    pub tournament: Tournament,
    pub participants: Vec<Participant>,
    pub finalist_participant_ids: Vec<Uuid>,
}

pub async fn get(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
) -> Result<Json<TournamentDetail>, AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let participants_repo = ParticipantRepository::new(state.db.clone());
    let game_participants = GameParticipantRepository::new();

    let tournament = tournaments.find_by_id(tournament_id).await?;
    let participants = participants_repo.list(tournament_id).await?;

    let finalist_participant_ids = if tournament.finals_started {
        let mut conn = state.db.acquire().await?;
        game_participants
            .actual_finalist_participant_ids(&mut conn, tournament_id)
            .await?
    } else {
        Vec::new()
    };

    Ok(Json(TournamentDetail {
        tournament,
        participants,
        finalist_participant_ids,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    actor: AuthUser,
    Json(req): Json<UpdateTournamentRequest>,
) -> Result<Json<Tournament>, AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let existing = tournaments.find_by_id(tournament_id).await?;

    if !authz::can_perform_structural(
        StructuralAction::ModifyStructuralFields,
        actor.role,
        actor.user_id == existing.creator_id,
    ) {
        return Err(AppError::Unauthorized(
            "only the tournament creator may modify structural fields".into(),
        ));
    }

    if let Some(capacity) = req.capacity {
        if capacity % 8 != 0 || !(8..=128).contains(&capacity) {
            return Err(AppError::Invalid(
                "capacity must be a multiple of 8 between 8 and 128".into(),
            ));
        }
    }

    let updated = tournaments
        .update_structural(
            tournament_id,
            req.name.as_deref(),
            req.capacity,
            req.total_rounds,
            req.first_round_strategy,
            req.lobby_maker_priority_list.as_deref(),
            req.registration_deadline,
        )
        .await?;

    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    actor: AuthUser,
) -> Result<(), AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let existing = tournaments.find_by_id(tournament_id).await?;

    if !authz::can_perform_structural(
        StructuralAction::DeleteTournament,
        actor.role,
        actor.user_id == existing.creator_id,
    ) {
        return Err(AppError::Unauthorized(
            "only the creator or a super admin may delete this tournament".into(),
        ));
    }

    tournaments.soft_delete(tournament_id).await?;
    Ok(())
}

pub async fn join(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    actor: AuthUser,
) -> Result<Json<Participant>, AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let participants = ParticipantRepository::new(state.db.clone());

    let mut tx = state.db.begin().await?;
    let tournament = tournaments.lock_for_update(&mut tx, tournament_id).await?;
    let count = participants.count_tx(&mut tx, tournament_id).await?;
    state_machine::can_join(tournament.status, count, tournament.capacity as i64)?;

    let participant = participants
        .join(&mut tx, tournament_id, actor.user_id)
        .await?;

    write_log(
        &mut tx,
        tournament_id,
        None,
        &actor,
        ActionType::ParticipantJoined,
        format!("{} joined the tournament", actor.tag),
    )
    .await?;

    tx.commit().await?;
    Ok(Json(participant))
}

pub async fn leave(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    actor: AuthUser,
) -> Result<(), AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let participants = ParticipantRepository::new(state.db.clone());

    let mut tx = state.db.begin().await?;
    let tournament = tournaments.lock_for_update(&mut tx, tournament_id).await?;
    state_machine::can_leave(tournament.status)?;
    participants
        .leave(&mut tx, tournament_id, actor.user_id)
        .await?;

    write_log(
        &mut tx,
        tournament_id,
        None,
        &actor,
        ActionType::ParticipantLeft,
        format!("{} left the tournament", actor.tag),
    )
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn start(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    actor: AuthUser,
) -> Result<Json<Tournament>, AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let participants = ParticipantRepository::new(state.db.clone());
    let rounds = RoundRepository::new(state.db.clone());
    let games = GameRepository::new(state.db.clone());

    let mut tx = state.db.begin().await?;
    let tournament = tournaments.lock_for_update(&mut tx, tournament_id).await?;

    if !authz::can_perform_structural(
        StructuralAction::CreateRound,
        actor.role,
        actor.user_id == tournament.creator_id,
    ) {
        return Err(AppError::Unauthorized(
            "only the tournament creator may start the tournament".into(),
        ));
    }

    let count = participants.count_tx(&mut tx, tournament_id).await?;
    state_machine::can_start(tournament.status, count, tournament.capacity as i64)?;

    let round = rounds.create_active(&mut tx, tournament_id, 1).await?;
    let game_count = tournament.games_per_round();
    let created_games = games
        .create_for_round(&mut tx, tournament_id, round.id, game_count)
        .await?;

    let seats = participants.list_for_pairing(&mut tx, tournament_id).await?;
    let seeds: Vec<pairing::Seed> = seats
        .iter()
        .map(|(_, user_id, rating, total_score)| pairing::Seed {
            user_id: *user_id,
            rating: *rating,
            total_score: *total_score,
        })
        .collect();
    let groups = match tournament.first_round_strategy {
        crate::models::FirstRoundStrategy::Random => pairing::random(&seeds, game_count as usize)?,
        crate::models::FirstRoundStrategy::Balanced => {
            pairing::balanced(&seeds, game_count as usize)?
        }
        crate::models::FirstRoundStrategy::StrongVsStrong => {
            pairing::strong_vs_strong(&seeds, game_count as usize)?
        }
    };

    let user_to_participant: HashMap<Uuid, Uuid> =
        seats.iter().map(|(pid, uid, _, _)| (*uid, *pid)).collect();
    seat_games(&mut tx, &state, &tournament, &created_games, &groups, &user_to_participant).await?;

    tournaments.mark_started(&mut tx, tournament_id).await?;

    write_log(
        &mut tx,
        tournament_id,
        None,
        &actor,
        ActionType::TournamentStarted,
        format!("{} started the tournament", actor.tag),
    )
    .await?;

    tx.commit().await?;

    let updated = tournaments.find_by_id(tournament_id).await?;

    manager::broadcast_to_tournament(
        &state,
        &participants,
        tournament_id,
        &Event::TournamentStarted {
            tournament_id,
            current_round: updated.current_round,
            title: updated.name.clone(),
            priority: "high",
            timestamp: Utc::now(),
        },
    )
    .await
    .ok();
    manager::broadcast_to_all(
        &state,
        &Event::NextRoundCreated {
            tournament_id,
            round_number: 1,
            is_final: false,
            final_round_number: None,
            force_reload: true,
            timestamp: Utc::now(),
        },
    )
    .await;

    Ok(Json(updated))
}

pub async fn next_round(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    actor: AuthUser,
) -> Result<Json<Round>, AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let participants = ParticipantRepository::new(state.db.clone());
    let rounds = RoundRepository::new(state.db.clone());
    let games = GameRepository::new(state.db.clone());
    let game_participants = GameParticipantRepository::new();

    let mut tx = state.db.begin().await?;
    let tournament = tournaments.lock_for_update(&mut tx, tournament_id).await?;

    if !authz::can_perform_structural(
        StructuralAction::AdvanceRound,
        actor.role,
        actor.user_id == tournament.creator_id,
    ) {
        return Err(AppError::Unauthorized(
            "only the tournament creator may advance the round".into(),
        ));
    }

    let current_round = rounds
        .find_by_number_tx(&mut tx, tournament_id, tournament.current_round)
        .await?;
    let fully_completed = rounds.is_fully_completed(&mut tx, current_round.id).await?;
    state_machine::can_advance_round(
        tournament.current_round,
        tournament.total_rounds,
        fully_completed,
    )?;

    rounds.mark_completed(&mut tx, current_round.id).await?;

    let next_round_number = tournament.current_round + 1;
    let is_finals_round = tournament.is_finals_round(next_round_number);

    let new_round = rounds
        .create_active(&mut tx, tournament_id, next_round_number)
        .await?;

    let (game_count, groups, user_to_participant) = if is_finals_round {
        let finalist_ids = game_participants
            .actual_finalist_participant_ids(&mut tx, tournament_id)
            .await?;
        let seats = participants
            .list_finalists_for_pairing(&mut tx, &finalist_ids)
            .await?;
        let seeds: Vec<pairing::Seed> = seats
            .iter()
            .map(|(_, user_id, rating, finals_score)| pairing::Seed {
                user_id: *user_id,
                rating: *rating,
                total_score: *finals_score,
            })
            .collect();
        let game_count = tournament.finals_games_per_round();
        let groups = pairing::swiss(&seeds, game_count as usize)?;
        let map: HashMap<Uuid, Uuid> = seats.iter().map(|(pid, uid, _, _)| (*uid, *pid)).collect();
        (game_count, groups, map)
    } else {
        let seats = participants.list_for_pairing(&mut tx, tournament_id).await?;
        let seeds: Vec<pairing::Seed> = seats
            .iter()
            .map(|(_, user_id, rating, total_score)| pairing::Seed {
                user_id: *user_id,
                rating: *rating,
                total_score: *total_score,
            })
            .collect();
        let game_count = tournament.games_per_round();
        let groups = pairing::swiss(&seeds, game_count as usize)?;
        let map: HashMap<Uuid, Uuid> = seats.iter().map(|(pid, uid, _, _)| (*uid, *pid)).collect();
        (game_count, groups, map)
    };

    let created_games = games
        .create_for_round(&mut tx, tournament_id, new_round.id, game_count)
        .await?;
    seat_games(&mut tx, &state, &tournament, &created_games, &groups, &user_to_participant).await?;

    tournaments
        .advance_current_round(&mut tx, tournament_id, next_round_number)
        .await?;

    write_log(
        &mut tx,
        tournament_id,
        None,
        &actor,
        ActionType::RoundAdvanced,
        format!("{} advanced to round {}", actor.tag, next_round_number),
    )
    .await?;

    tx.commit().await?;

    manager::broadcast_to_all(
        &state,
        &Event::NextRoundCreated {
            tournament_id,
            round_number: next_round_number,
            is_final: is_finals_round,
            final_round_number: is_finals_round
                .then_some(next_round_number - tournament.regular_rounds),
            force_reload: true,
            timestamp: Utc::now(),
        },
    )
    .await;

    Ok(Json(new_round))
}

pub async fn start_finals(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    actor: AuthUser,
) -> Result<Json<Tournament>, AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let participants = ParticipantRepository::new(state.db.clone());
    let rounds = RoundRepository::new(state.db.clone());
    let games = GameRepository::new(state.db.clone());

    let mut tx = state.db.begin().await?;
    let tournament = tournaments.lock_for_update(&mut tx, tournament_id).await?;

    if !authz::can_perform_structural(
        StructuralAction::StartFinals,
        actor.role,
        actor.user_id == tournament.creator_id,
    ) {
        return Err(AppError::Unauthorized(
            "only the tournament creator may start finals".into(),
        ));
    }

    let last_regular = rounds
        .find_by_number_tx(&mut tx, tournament_id, tournament.regular_rounds)
        .await?;
    let regular_complete = rounds.is_fully_completed(&mut tx, last_regular.id).await?;
    state_machine::can_start_finals(tournament.with_finals, tournament.finals_started, regular_complete)?;

    if last_regular.status != crate::models::RoundStatus::Completed {
        rounds.mark_completed(&mut tx, last_regular.id).await?;
    }

    let seats = participants.list_for_pairing(&mut tx, tournament_id).await?;
    let candidates: Vec<(Uuid, Uuid, f64)> = seats
        .iter()
        .map(|(pid, uid, _, score)| (*pid, *uid, *score))
        .collect();
    let n = tournament.finals_participants_count.unwrap_or(0) as usize;
    let finalists = state_machine::select_finalists(&candidates, n);

    let new_total_rounds = tournament.regular_rounds + tournament.finals_games_count.unwrap_or(0);
    let new_current_round = tournament.regular_rounds + 1;
    tournaments
        .mark_finals_started(&mut tx, tournament_id, new_total_rounds, new_current_round)
        .await?;

    let round = rounds
        .create_active(&mut tx, tournament_id, new_current_round)
        .await?;
    let game_count = tournament.finals_games_per_round();
    let created_games = games
        .create_for_round(&mut tx, tournament_id, round.id, game_count)
        .await?;

    // finalists already sorted by total_score descending (§4.6).
    let groups: Vec<Vec<Uuid>> = finalists
        .chunks(8)
        .map(|chunk| chunk.iter().map(|(_, uid, _)| *uid).collect())
        .collect();
    let user_to_participant: HashMap<Uuid, Uuid> =
        finalists.iter().map(|(pid, uid, _)| (*uid, *pid)).collect();

    let mut reloaded = tournament.clone();
    reloaded.total_rounds = new_total_rounds;
    reloaded.current_round = new_current_round;
    reloaded.finals_started = true;

    seat_games(&mut tx, &state, &reloaded, &created_games, &groups, &user_to_participant).await?;

    write_log(
        &mut tx,
        tournament_id,
        None,
        &actor,
        ActionType::FinalsStarted,
        format!("{} started finals with {} finalists", actor.tag, finalists.len()),
    )
    .await?;

    tx.commit().await?;

    let finalist_user_ids: Vec<Uuid> = finalists.iter().map(|(_, uid, _)| *uid).collect();
    manager::broadcast_to_users(
        &state,
        &finalist_user_ids,
        &Event::FinalsStarted {
            tournament_id,
            finalists_count: finalists.len() as i32,
            timestamp: Utc::now(),
        },
    )
    .await;
    manager::broadcast_to_all(
        &state,
        &Event::NextRoundCreated {
            tournament_id,
            round_number: new_current_round,
            is_final: true,
            final_round_number: Some(1),
            force_reload: true,
            timestamp: Utc::now(),
        },
    )
    .await;

    let updated = tournaments.find_by_id(tournament_id).await?;
    Ok(Json(updated))
}

pub async fn finish(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    actor: AuthUser,
) -> Result<Json<Tournament>, AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let participants = ParticipantRepository::new(state.db.clone());
    let rounds = RoundRepository::new(state.db.clone());
    let game_participants = GameParticipantRepository::new();

    let mut tx = state.db.begin().await?;
    let tournament = tournaments.lock_for_update(&mut tx, tournament_id).await?;

    if !authz::can_perform_structural(
        StructuralAction::FinishTournament,
        actor.role,
        actor.user_id == tournament.creator_id,
    ) {
        return Err(AppError::Unauthorized(
            "only the tournament creator may finish the tournament".into(),
        ));
    }

    let all_rounds = rounds.list(tournament_id).await?;
    let mut all_rounds_complete = true;
    let mut all_results_submitted = true;
    for round in &all_rounds {
        let round_fully_played = rounds.is_fully_completed(&mut tx, round.id).await?;
        if !round_fully_played {
            all_rounds_complete = false;
            all_results_submitted = false;
            continue;
        }
        // The last round is never advanced past (there is no next round to
        // create), so unlike every earlier round it is still `active` here
        // even though all its games are done. Close it out now, same as
        // `start_finals` does for the last regular round.
        if round.status != crate::models::RoundStatus::Completed {
            rounds.mark_completed(&mut tx, round.id).await?;
        }
    }
    state_machine::can_finish(all_rounds_complete, all_results_submitted)?;

    let all_participants = participants.list_tx(&mut tx, tournament_id).await?;

    let finalist_ids: std::collections::HashSet<Uuid> = if tournament.finals_started {
        game_participants
            .actual_finalist_participant_ids(&mut tx, tournament_id)
            .await?
            .into_iter()
            .collect()
    } else {
        Default::default()
    };

    let mut rows = HashMap::new();
    for p in &all_participants {
        let best = game_participants
            .best_placement_for_participant(&mut tx, p.id)
            .await?;
        rows.insert(
            p.id,
            crate::domain::ranker::ScoreRow {
                participant_id: p.id,
                total_score: p.total_score,
                finals_score: p.finals_score,
                best_placement: best,
                random_tiebreak: crate::domain::ranker::random_tiebreak(),
            },
        );
    }

    let ranked = if tournament.finals_started && !finalist_ids.is_empty() {
        let finalists: Vec<_> = rows
            .iter()
            .filter(|(id, _)| finalist_ids.contains(id))
            .map(|(_, row)| *row)
            .collect();
        let non_finalists: Vec<_> = rows
            .iter()
            .filter(|(id, _)| !finalist_ids.contains(id))
            .map(|(_, row)| *row)
            .collect();
        crate::domain::ranker::rank_with_finals(&finalists, &non_finalists)
    } else {
        let all: Vec<_> = rows.values().copied().collect();
        crate::domain::ranker::rank_without_finals(&all)
    };

    for (participant_id, position) in &ranked {
        participants
            .set_final_position(&mut tx, *participant_id, *position)
            .await?;
    }

    tournaments.mark_finished(&mut tx, tournament_id).await?;

    write_log(
        &mut tx,
        tournament_id,
        None,
        &actor,
        ActionType::TournamentFinished,
        format!("{} finished the tournament", actor.tag),
    )
    .await?;

    tx.commit().await?;

    manager::broadcast_to_all(
        &state,
        &Event::TournamentFinished {
            tournament_id,
            force_reload: true,
            timestamp: Utc::now(),
        },
    )
    .await;

    let updated = tournaments.find_by_id(tournament_id).await?;
    Ok(Json(updated))
}

pub async fn finals_swap(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    actor: AuthUser,
    Json(req): Json<FinalistSwapRequest>,
) -> Result<(), AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let participants = ParticipantRepository::new(state.db.clone());
    let game_participants = GameParticipantRepository::new();

    let mut tx = state.db.begin().await?;
    let tournament = tournaments.lock_for_update(&mut tx, tournament_id).await?;

    if !authz::can_perform_structural(
        StructuralAction::SwapFinalist,
        actor.role,
        actor.user_id == tournament.creator_id,
    ) {
        return Err(AppError::Unauthorized(
            "only the creator or a super admin may swap a finalist".into(),
        ));
    }

    let any_result = game_participants
        .any_finals_result_submitted(&mut tx, tournament_id)
        .await?;
    finals::can_swap_finalist(tournament.finals_started, any_result)?;

    let finalist_ids = game_participants
        .actual_finalist_participant_ids(&mut tx, tournament_id)
        .await?;
    let from_is_finalist = finalist_ids.contains(&req.from_participant_id);
    let to_is_finalist = finalist_ids.contains(&req.to_participant_id);
    finals::validate_swap_targets(from_is_finalist, to_is_finalist)?;

    let to_participant = participants
        .find_by_id_tx(&mut tx, req.to_participant_id)
        .await?;
    if to_participant.tournament_id != tournament_id {
        return Err(AppError::Invalid(
            "to_participant_id does not belong to this tournament".into(),
        ));
    }

    game_participants
        .rewrite_finalist(&mut tx, tournament_id, req.from_participant_id, req.to_participant_id)
        .await?;

    write_log(
        &mut tx,
        tournament_id,
        None,
        &actor,
        ActionType::FinalistSwapped,
        format!(
            "{} swapped finalist {} for {}",
            actor.tag, req.from_participant_id, req.to_participant_id
        ),
    )
    .await?;

    tx.commit().await?;
    Ok(())
}

pub async fn swap_participant(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    actor: AuthUser,
    Json(req): Json<ParticipantSwapRequest>,
) -> Result<(), AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let participants = ParticipantRepository::new(state.db.clone());

    let mut tx = state.db.begin().await?;
    let tournament = tournaments.lock_for_update(&mut tx, tournament_id).await?;

    if !authz::can_perform_structural(
        StructuralAction::SwapParticipant,
        actor.role,
        actor.user_id == tournament.creator_id,
    ) {
        return Err(AppError::Unauthorized(
            "only the creator or a super admin may swap a participant".into(),
        ));
    }

    let participant = participants
        .find_by_user(tournament_id, req.from_user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("from_user_id is not a participant".into()))?;

    let has_round1_result = if tournament.status == TournamentStatus::Active {
        let games = GameRepository::new(state.db.clone());
        let game_participants = GameParticipantRepository::new();
        let round = RoundRepository::new(state.db.clone())
            .find_by_number_tx(&mut tx, tournament_id, 1)
            .await?;
        let round_games = games.list_by_round_tx(&mut tx, round.id).await?;
        let mut found = false;
        for g in round_games {
            if game_participants
                .find(&mut tx, g.id, participant.id)
                .await
                .map(|gp| gp.positions.is_some())
                .unwrap_or(false)
            {
                found = true;
                break;
            }
        }
        found
    } else {
        false
    };

    finals::can_swap_participant(tournament.status, tournament.current_round, has_round1_result)?;

    participants
        .swap_user(&mut tx, participant.id, req.to_user_id)
        .await?;

    write_log(
        &mut tx,
        tournament_id,
        None,
        &actor,
        ActionType::ParticipantSwapped,
        format!(
            "{} swapped participant {} to user {}",
            actor.tag, req.from_user_id, req.to_user_id
        ),
    )
    .await?;

    tx.commit().await?;
    Ok(())
}

#[derive(Debug, serde::Serialize)]
pub struct RoundGamesView {
    pub round: Round,
    pub games: Vec<GameView>,
}

#[derive(Debug, serde::Serialize)]
pub struct GameView {
    #[serde(flatten)]
    pub game: crate::models::Game,
    pub slots: Vec<crate::models::GameParticipant>,
}

pub async fn round_games(
    State(state): State<AppState>,
    Path((tournament_id, round_number)): Path<(Uuid, i32)>,
) -> Result<Json<RoundGamesView>, AppError> {
    let rounds = RoundRepository::new(state.db.clone());
    let games = GameRepository::new(state.db.clone());
    let game_participants = GameParticipantRepository::new();

    let round = rounds.find_by_number(tournament_id, round_number).await?;
    let round_games = games.list_by_round(round.id).await?;

    let mut conn = state.db.acquire().await?;
    let mut views = Vec::with_capacity(round_games.len());
    for game in round_games {
        let slots = game_participants.list_by_game(&mut conn, game.id).await?;
        views.push(GameView { game, slots });
    }

    Ok(Json(RoundGamesView { round, games: views }))
}

pub async fn logs(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
    actor: AuthUser,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<crate::models::LogRecord>>, AppError> {
    let tournaments = TournamentRepository::new(state.db.clone());
    let participants = ParticipantRepository::new(state.db.clone());
    let tournament = tournaments.find_by_id(tournament_id).await?;

    let is_participant = participants
        .find_by_user(tournament_id, actor.user_id)
        .await?
        .is_some();
    if !authz::can_read_logs(actor.user_id, actor.role, tournament.creator_id, is_participant) {
        return Err(AppError::Unauthorized(
            "only participants, the creator, or admins may read this tournament's logs".into(),
        ));
    }

    let log_repo = LogRepository::new();
    let rows = log_repo
        .list_for_tournament(&state.db, tournament_id, page.limit(), page.offset())
        .await?;
    Ok(Json(rows))
}

pub async fn finals_leaderboard(
    State(state): State<AppState>,
    Path(tournament_id): Path<Uuid>,
) -> Result<Json<Vec<(Uuid, f64)>>, AppError> {
    let participants = ParticipantRepository::new(state.db.clone());
    let game_participants = GameParticipantRepository::new();
    let mut conn = state.db.acquire().await?;
    let finalist_ids = game_participants
        .actual_finalist_participant_ids(&mut conn, tournament_id)
        .await?;

    let mut entries = Vec::with_capacity(finalist_ids.len());
    for id in finalist_ids {
        let p = participants.find_by_id(id).await?;
        entries.push((p.id, p.finals_score));
    }
    Ok(Json(finals::finals_leaderboard(&entries)))
}

/// Persists `groups` (user ids per game, in game order) as `GameParticipant`
/// rows and runs the lobby-maker selector for each seated game (§4.3, §4.4).
async fn seat_games(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    state: &AppState,
    tournament: &Tournament,
    games: &[crate::models::Game],
    groups: &[Vec<Uuid>],
    user_to_participant: &HashMap<Uuid, Uuid>,
) -> Result<(), AppError> {
    let game_participants = GameParticipantRepository::new();
    let game_repo = GameRepository::new(state.db.clone());
    let users = UserRepository::new(state.db.clone());
    let creator = users.find_by_id(tournament.creator_id).await?;

    let priority_list = lobby_maker::effective_priority_list(
        &creator.favorite_lobby_makers,
        &tournament.lobby_maker_priority_list,
    );

    for (game, user_ids) in games.iter().zip(groups.iter()) {
        let participant_ids: Vec<Uuid> = user_ids
            .iter()
            .filter_map(|uid| user_to_participant.get(uid).copied())
            .collect();
        game_participants
            .create_many(tx, game.id, &participant_ids)
            .await?;

        if let Some(chosen_user_id) = lobby_maker::select(&priority_list, user_ids) {
            if let Some(participant_id) = user_to_participant.get(&chosen_user_id) {
                game_participants
                    .set_lobby_maker_flag(tx, game.id, *participant_id)
                    .await?;
                game_repo
                    .set_lobby_maker(tx, game.id, Some(chosen_user_id))
                    .await?;
            }
        }
    }
    Ok(())
}

/// Shared by every mutating handler in this module and by `results`/`lobby_maker`:
/// builds an audit record from the request actor and inserts it inside the
/// caller's open transaction (§4.10).
pub(crate) async fn write_log(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    tournament_id: Uuid,
    game_id: Option<Uuid>,
    actor: &AuthUser,
    action: ActionType,
    description: String,
) -> Result<(), AppError> {
    let record = audit::build_record(
        tournament_id,
        game_id,
        actor.user_id,
        actor.tag.clone(),
        actor.role,
        action,
        description,
    );
    LogRepository::new().insert(tx, &record).await
}
