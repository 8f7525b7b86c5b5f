//! Lobby-maker selector (SPEC_FULL.md §4.3).

use uuid::Uuid;

/// Merges the creator's global favourites with the tournament's override
/// list, (1) then (2), deduplicated with first occurrence preserved.
pub fn effective_priority_list(
    creator_favorite_lobby_makers: &[Uuid],
    tournament_priority_list: &[Uuid],
) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for id in creator_favorite_lobby_makers
        .iter()
        .chain(tournament_priority_list.iter())
    {
        if seen.insert(*id) {
            out.push(*id);
        }
    }
    out
}

/// Scans the effective priority list top-down, returning the first id that
/// holds a participant slot in `G` (given as the set of user ids seated in
/// that game). `None` if nothing in the list matches — the caller leaves the
/// game's lobby maker unassigned.
pub fn select(priority_list: &[Uuid], game_user_ids: &[Uuid]) -> Option<Uuid> {
    priority_list
        .iter()
        .find(|candidate| game_user_ids.contains(candidate))
        .copied()
}

/// Manual reassignment is allowed only while the game has zero submitted
/// results, and only for a user actually seated in the game.
pub fn can_assign(game_has_results: bool, candidate_in_game: bool) -> bool {
    !game_has_results && candidate_in_game
}

/// Removal is allowed only while zero results exist.
pub fn can_remove(game_has_results: bool) -> bool {
    !game_has_results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_preserves_first_occurrence() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let favorites = vec![a, b];
        let overrides = vec![b, a];
        assert_eq!(effective_priority_list(&favorites, &overrides), vec![a, b]);
    }

    #[test]
    fn select_returns_first_seated_match() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();
        let priority = vec![a, b, c];
        assert_eq!(select(&priority, &[b, c]), Some(b));
    }

    #[test]
    fn select_none_when_nobody_seated_matches() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(select(&[a], &[b]), None);
    }

    #[test]
    fn assign_rejected_once_results_exist_or_candidate_absent() {
        assert!(!can_assign(true, true));
        assert!(!can_assign(false, false));
        assert!(can_assign(false, true));
    }
}
