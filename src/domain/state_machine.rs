//! Tournament state machine (SPEC_FULL.md §4.6).
//!
//! Each function here checks one transition's preconditions against already
//! loaded facts and returns `Ok(())` or the precise `AppError::InvalidState`
//! the caller should surface. The caller is responsible for holding the
//! `SELECT ... FOR UPDATE` lock on the tournament row (§5) before calling
//! any of these, and for performing the actual row mutations afterward.

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::TournamentStatus;

pub fn can_start(
    status: TournamentStatus,
    participant_count: i64,
    capacity: i64,
) -> Result<(), AppError> {
    if status != TournamentStatus::Registration {
        return Err(AppError::InvalidState(
            "tournament must be in registration to start".into(),
        ));
    }
    if participant_count != capacity {
        return Err(AppError::InvalidState(format!(
            "tournament requires exactly {} participants to start, has {}",
            capacity, participant_count
        )));
    }
    Ok(())
}

/// `current_round` here is the round being advanced *from*.
pub fn can_advance_round(
    current_round: i32,
    total_rounds: i32,
    current_round_fully_completed: bool,
) -> Result<(), AppError> {
    if current_round >= total_rounds {
        return Err(AppError::InvalidState(
            "already at the final round, cannot advance".into(),
        ));
    }
    if !current_round_fully_completed {
        return Err(AppError::InvalidState(
            "every game in the current round must be completed before advancing".into(),
        ));
    }
    Ok(())
}

pub fn can_start_finals(
    with_finals: bool,
    finals_started: bool,
    regular_rounds_complete: bool,
) -> Result<(), AppError> {
    if !with_finals {
        return Err(AppError::InvalidState(
            "this tournament was not configured with finals".into(),
        ));
    }
    if finals_started {
        return Err(AppError::InvalidState("finals have already started".into()));
    }
    if !regular_rounds_complete {
        return Err(AppError::InvalidState(
            "all regular rounds must be complete before finals can start".into(),
        ));
    }
    Ok(())
}

pub fn can_finish(all_rounds_complete: bool, all_results_submitted: bool) -> Result<(), AppError> {
    if !all_rounds_complete || !all_results_submitted {
        return Err(AppError::InvalidState(
            "every round must be complete and every result submitted before finishing".into(),
        ));
    }
    Ok(())
}

/// Cancellation shares "delete tournament"'s actor requirement (§4.2) but is
/// its own transition, allowed only from `registration`.
pub fn can_cancel(status: TournamentStatus) -> Result<(), AppError> {
    if status != TournamentStatus::Registration {
        return Err(AppError::InvalidState(
            "only a tournament still in registration may be cancelled".into(),
        ));
    }
    Ok(())
}

pub fn can_join(status: TournamentStatus, current_count: i64, capacity: i64) -> Result<(), AppError> {
    if status != TournamentStatus::Registration {
        return Err(AppError::InvalidState(
            "tournament is not accepting new participants".into(),
        ));
    }
    if current_count >= capacity {
        return Err(AppError::InvalidState("tournament is at capacity".into()));
    }
    Ok(())
}

pub fn can_leave(status: TournamentStatus) -> Result<(), AppError> {
    if status != TournamentStatus::Registration {
        return Err(AppError::InvalidState(
            "leaving is only permitted during registration".into(),
        ));
    }
    Ok(())
}

/// Top-N participants by `total_score` descending, used by `start_finals`.
/// `participants` is `(participant_id, user_id, total_score)`; stable on
/// ties (insertion order), matching §4.4's Swiss tie-break convention.
pub fn select_finalists(
    participants: &[(Uuid, Uuid, f64)],
    n: usize,
) -> Vec<(Uuid, Uuid, f64)> {
    let mut sorted = participants.to_vec();
    sorted.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap());
    sorted.truncate(n);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_requires_registration_and_full_capacity() {
        assert!(can_start(TournamentStatus::Registration, 16, 16).is_ok());
        assert!(can_start(TournamentStatus::Registration, 15, 16).is_err());
        assert!(can_start(TournamentStatus::Active, 16, 16).is_err());
    }

    #[test]
    fn advance_round_blocked_at_last_round() {
        assert!(can_advance_round(3, 3, true).is_err());
        assert!(can_advance_round(2, 3, true).is_ok());
        assert!(can_advance_round(2, 3, false).is_err());
    }

    #[test]
    fn start_finals_requires_configured_not_started_and_regular_complete() {
        assert!(can_start_finals(false, false, true).is_err());
        assert!(can_start_finals(true, true, true).is_err());
        assert!(can_start_finals(true, false, false).is_err());
        assert!(can_start_finals(true, false, true).is_ok());
    }

    #[test]
    fn cancel_only_from_registration() {
        assert!(can_cancel(TournamentStatus::Registration).is_ok());
        assert!(can_cancel(TournamentStatus::Active).is_err());
    }

    #[test]
    fn select_finalists_takes_top_n_by_score_stably() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let participants = vec![(a, a, 10.0), (b, b, 20.0), (c, c, 20.0)];
        let top2 = select_finalists(&participants, 2);
        assert_eq!(top2.len(), 2);
        assert_eq!(top2[0].0, b);
        assert_eq!(top2[1].0, c);
    }
}
