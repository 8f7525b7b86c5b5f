//! Result ingest (SPEC_FULL.md §4.5): shape validation, cross-slot conflict
//! checking, and score aggregation. Persistence (loading/writing
//! `GameParticipant` rows, recomputing `Participant.total_score` /
//! `finals_score`) lives in `db::game_participant` and `db::participant`;
//! this module holds the pure rules those repositories apply.

use std::collections::HashMap;

use crate::errors::AppError;

/// Validates that `positions` is non-empty, made of distinct integers in
/// `[1,8]`, and consecutive once sorted. Returns the sorted vector.
pub fn validate_positions(positions: &[i32]) -> Result<Vec<i32>, AppError> {
    if positions.is_empty() {
        return Err(AppError::Invalid("positions must not be empty".into()));
    }
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() != positions.len() {
        return Err(AppError::Invalid("positions must be distinct".into()));
    }
    if *sorted.first().unwrap() < 1 || *sorted.last().unwrap() > 8 {
        return Err(AppError::Invalid("positions must be within [1,8]".into()));
    }
    for pair in sorted.windows(2) {
        if pair[1] != pair[0] + 1 {
            return Err(AppError::Invalid(
                "positions must be consecutive when sorted".into(),
            ));
        }
    }
    Ok(sorted)
}

/// Checks `candidate` (already validated/sorted) against every other slot
/// already filled in the same game, per §4.5's three conflict rules:
/// a single-position slot can't overlap any other slot; a shared group can
/// coexist with an identical group up to `|group|` occurrences in total;
/// different overlapping groups are mutually exclusive.
pub fn check_conflicts(candidate: &[i32], other_slots: &[Vec<i32>]) -> Result<(), AppError> {
    let overlaps = |a: &[i32], b: &[i32]| a.iter().any(|x| b.contains(x));

    if candidate.len() == 1 {
        if other_slots.iter().any(|other| overlaps(candidate, other)) {
            return Err(AppError::Conflict(
                "a single-position slot cannot share a position with another slot".into(),
            ));
        }
        return Ok(());
    }

    let identical_count = other_slots.iter().filter(|o| o.as_slice() == candidate).count();
    if identical_count + 1 > candidate.len() {
        return Err(AppError::Conflict(format!(
            "group {:?} already has {} holders, at most {} allowed",
            candidate,
            identical_count,
            candidate.len()
        )));
    }

    for other in other_slots {
        if other.as_slice() != candidate && overlaps(candidate, other) {
            return Err(AppError::Conflict(format!(
                "overlapping but distinct placement groups {:?} and {:?} are mutually exclusive",
                candidate, other
            )));
        }
    }
    Ok(())
}

/// Validates an entire batch (pairs of participant id and raw positions)
/// up front: each slot's shape plus all intra-batch conflicts, before any
/// single slot is applied.
pub fn validate_batch<'a, I>(entries: I) -> Result<Vec<(uuid::Uuid, Vec<i32>)>, AppError>
where
    I: IntoIterator<Item = (uuid::Uuid, &'a [i32])>,
{
    let mut validated = Vec::new();
    for (participant_id, positions) in entries {
        let sorted = validate_positions(positions)?;
        let already: Vec<Vec<i32>> = validated.iter().map(|(_, p): &(uuid::Uuid, Vec<i32>)| p.clone()).collect();
        check_conflicts(&sorted, &already)?;
        validated.push((participant_id, sorted));
    }
    Ok(validated)
}

/// A completed slot's contribution to aggregate scoring: which round it
/// belongs to and its already-computed point value.
pub struct ScoredSlot {
    pub round_number: i32,
    pub calculated_points: f64,
}

/// Recomputes `(total_score, finals_score)` from authoritative row-level
/// `calculated_points`, partitioned by whether the owning round is in the
/// regular phase (`round_number <= regular_rounds`) or the finals phase.
pub fn recompute_scores(slots: &[ScoredSlot], regular_rounds: i32) -> (f64, f64) {
    let mut total = 0.0;
    let mut finals = 0.0;
    for slot in slots {
        if slot.round_number <= regular_rounds {
            total += slot.calculated_points;
        } else {
            finals += slot.calculated_points;
        }
    }
    (total, finals)
}

/// A game is `completed` iff every slot (by participant id) has a non-null
/// placement.
pub fn is_game_complete(slot_positions: &HashMap<uuid::Uuid, Option<Vec<i32>>>) -> bool {
    !slot_positions.is_empty() && slot_positions.values().all(|p| p.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn validate_positions_rejects_non_consecutive() {
        assert!(validate_positions(&[1, 3]).is_err());
    }

    #[test]
    fn validate_positions_sorts_input() {
        assert_eq!(validate_positions(&[3, 2]).unwrap(), vec![2, 3]);
    }

    #[test]
    fn single_slot_conflicts_with_any_overlap() {
        assert!(check_conflicts(&[3], &[vec![2, 3]]).is_err());
    }

    #[test]
    fn identical_group_allowed_up_to_group_size() {
        // group of size 2 ([2,3]) may appear for up to 2 participants total.
        assert!(check_conflicts(&[2, 3], &[vec![2, 3]]).is_ok());
        assert!(check_conflicts(&[2, 3], &[vec![2, 3], vec![2, 3]]).is_err());
    }

    #[test]
    fn distinct_overlapping_groups_rejected() {
        assert!(check_conflicts(&[2, 3], &[vec![3, 4]]).is_err());
    }

    #[test]
    fn batch_validation_catches_intra_batch_conflicts() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let pos_a = [3i32];
        let pos_b = [2i32, 3];
        let entries = vec![(a, pos_a.as_slice()), (b, pos_b.as_slice())];
        assert!(validate_batch(entries).is_err());
    }

    #[test]
    fn score_recompute_partitions_by_regular_rounds() {
        let slots = vec![
            ScoredSlot { round_number: 1, calculated_points: 5.0 },
            ScoredSlot { round_number: 2, calculated_points: 3.0 },
            ScoredSlot { round_number: 3, calculated_points: 2.0 },
        ];
        let (total, finals) = recompute_scores(&slots, 2);
        assert_eq!(total, 8.0);
        assert_eq!(finals, 2.0);
    }

    #[test]
    fn game_complete_requires_every_slot_filled() {
        let mut m = HashMap::new();
        m.insert(Uuid::new_v4(), Some(vec![1]));
        m.insert(Uuid::new_v4(), None);
        assert!(!is_game_complete(&m));
    }
}
