//! Pairing strategies (SPEC_FULL.md §4.4), grounded on
//! `services/tournament_strategies.py`'s `_assign_participants_*` methods.
//!
//! Every strategy here is a pure function from a participant slice to a
//! `Vec<Vec<Uuid>>` of exactly `games` groups of 8 user ids each (in the
//! order games should receive them). Persisting the resulting
//! `GameParticipant` rows and running the lobby-maker selector afterward is
//! the caller's job (`http::handlers::tournament`).

use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::errors::AppError;

const GAME_SIZE: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct Seed {
    pub user_id: Uuid,
    pub rating: i32,
    pub total_score: f64,
}

fn require_exact_capacity(seeds: &[Seed], games: usize) -> Result<(), AppError> {
    if seeds.len() != games * GAME_SIZE {
        return Err(AppError::Invalid(format!(
            "expected {} participants for {} games, got {}",
            games * GAME_SIZE,
            games,
            seeds.len()
        )));
    }
    Ok(())
}

/// Uniform shuffle, deal 8 per game in order.
pub fn random(seeds: &[Seed], games: usize) -> Result<Vec<Vec<Uuid>>, AppError> {
    require_exact_capacity(seeds, games)?;
    let mut ids: Vec<Uuid> = seeds.iter().map(|s| s.user_id).collect();
    ids.shuffle(&mut rand::rng());
    Ok(ids.chunks(GAME_SIZE).map(|c| c.to_vec()).collect())
}

/// Snake draft: sort by rating descending (missing rating treated as 0 by
/// the caller when building `Seed`), then deal with a reversing cycle of
/// length `2 * games` so strong players spread across lobbies instead of
/// stacking in game 1.
pub fn balanced(seeds: &[Seed], games: usize) -> Result<Vec<Vec<Uuid>>, AppError> {
    require_exact_capacity(seeds, games)?;
    let mut sorted = seeds.to_vec();
    sorted.sort_by(|a, b| b.rating.cmp(&a.rating));

    let mut groups: Vec<Vec<Uuid>> = vec![Vec::with_capacity(GAME_SIZE); games];
    for (i, seed) in sorted.iter().enumerate() {
        let cycle_pos = i % (2 * games);
        let game_index = if cycle_pos < games {
            cycle_pos
        } else {
            2 * games - 1 - cycle_pos
        };
        groups[game_index].push(seed.user_id);
    }
    Ok(groups)
}

/// Sort by rating descending, fill games in order (top 8 in game 1, …).
pub fn strong_vs_strong(seeds: &[Seed], games: usize) -> Result<Vec<Vec<Uuid>>, AppError> {
    require_exact_capacity(seeds, games)?;
    let mut sorted = seeds.to_vec();
    sorted.sort_by(|a, b| b.rating.cmp(&a.rating));
    let ids: Vec<Uuid> = sorted.iter().map(|s| s.user_id).collect();
    Ok(ids.chunks(GAME_SIZE).map(|c| c.to_vec()).collect())
}

/// Swiss re-pairing for round >= 2: sort by `total_score` descending, stable
/// (ties keep current insertion order), fill games in order.
pub fn swiss(seeds: &[Seed], games: usize) -> Result<Vec<Vec<Uuid>>, AppError> {
    require_exact_capacity(seeds, games)?;
    let mut sorted = seeds.to_vec();
    sorted.sort_by(|a, b| b.total_score.partial_cmp(&a.total_score).unwrap());
    let ids: Vec<Uuid> = sorted.iter().map(|s| s.user_id).collect();
    Ok(ids.chunks(GAME_SIZE).map(|c| c.to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeds(n: usize) -> Vec<Seed> {
        (0..n)
            .map(|i| Seed {
                user_id: Uuid::new_v4(),
                rating: (n - i) as i32,
                total_score: (n - i) as f64,
            })
            .collect()
    }

    #[test]
    fn random_rejects_wrong_count() {
        assert!(random(&seeds(7), 1).is_err());
    }

    #[test]
    fn random_produces_exact_groups() {
        let out = random(&seeds(16), 2).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].len(), 8);
        assert_eq!(out[1].len(), 8);
    }

    #[test]
    fn balanced_snake_spreads_top_seeds_across_games() {
        let s = seeds(16);
        let out = balanced(&s, 2).unwrap();
        // Highest-rated seed (index 0, rating 16) goes to game 0;
        // second-highest (index 1, rating 15) goes to game 1 (snake reversal).
        assert_eq!(out[0][0], s[0].user_id);
        assert_eq!(out[1][0], s[1].user_id);
    }

    #[test]
    fn strong_vs_strong_stacks_top_seeds_in_first_game() {
        let s = seeds(16);
        let out = strong_vs_strong(&s, 2).unwrap();
        assert_eq!(out[0], s[0..8].iter().map(|x| x.user_id).collect::<Vec<_>>());
    }

    #[test]
    fn swiss_sorts_by_total_score_descending_stably() {
        let mut s = seeds(16);
        // Force a tie between the first two to confirm stability.
        s[0].total_score = 10.0;
        s[1].total_score = 10.0;
        let out = swiss(&s, 2).unwrap();
        assert_eq!(out[0][0], s[0].user_id);
        assert_eq!(out[0][1], s[1].user_id);
    }
}
