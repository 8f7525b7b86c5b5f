//! Finals subsystem and finalist/participant swap (SPEC_FULL.md §4.7).

use uuid::Uuid;

use crate::errors::AppError;
use crate::models::TournamentStatus;

/// Finals leaderboard: actual finalists ranked by `finals_score` descending.
/// `entries` is `(participant_id, finals_score)`.
pub fn finals_leaderboard(entries: &[(Uuid, f64)]) -> Vec<(Uuid, f64)> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    sorted
}

/// Finalist swap precondition: finals must have started and no finals game
/// may have any submitted result yet.
pub fn can_swap_finalist(finals_started: bool, any_finals_result_submitted: bool) -> Result<(), AppError> {
    if !finals_started {
        return Err(AppError::InvalidState("finals have not started".into()));
    }
    if any_finals_result_submitted {
        return Err(AppError::InvalidState(
            "cannot swap a finalist once any finals result has been submitted".into(),
        ));
    }
    Ok(())
}

/// Finalist swap rejects a `to_participant_id` that is already a finalist.
pub fn validate_swap_targets(
    from_is_finalist: bool,
    to_is_finalist: bool,
) -> Result<(), AppError> {
    if !from_is_finalist {
        return Err(AppError::Invalid(
            "from_participant_id is not currently a finalist".into(),
        ));
    }
    if to_is_finalist {
        return Err(AppError::Invalid(
            "to_participant_id is already a finalist".into(),
        ));
    }
    Ok(())
}

/// Pre-finals participant swap precondition: either still in registration,
/// or active with `current_round == 1` and the participant has no submitted
/// result yet in round 1.
pub fn can_swap_participant(
    status: TournamentStatus,
    current_round: i32,
    participant_has_round1_result: bool,
) -> Result<(), AppError> {
    match status {
        TournamentStatus::Registration => Ok(()),
        TournamentStatus::Active if current_round == 1 && !participant_has_round1_result => Ok(()),
        TournamentStatus::Active => Err(AppError::InvalidState(
            "participant swap is only allowed before round 1 has results, or during registration"
                .into(),
        )),
        _ => Err(AppError::InvalidState(
            "tournament is not in a state that allows a participant swap".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaderboard_sorts_by_finals_score_desc() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let board = finals_leaderboard(&[(a, 3.0), (b, 9.0)]);
        assert_eq!(board[0].0, b);
    }

    #[test]
    fn swap_finalist_blocked_once_a_finals_result_exists() {
        assert!(can_swap_finalist(true, false).is_ok());
        assert!(can_swap_finalist(true, true).is_err());
        assert!(can_swap_finalist(false, false).is_err());
    }

    #[test]
    fn swap_participant_allowed_in_registration_or_round1_no_result() {
        assert!(can_swap_participant(TournamentStatus::Registration, 0, false).is_ok());
        assert!(can_swap_participant(TournamentStatus::Active, 1, false).is_ok());
        assert!(can_swap_participant(TournamentStatus::Active, 1, true).is_err());
        assert!(can_swap_participant(TournamentStatus::Active, 2, false).is_err());
    }
}
