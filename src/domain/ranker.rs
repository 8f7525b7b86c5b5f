//! Final-position ranker (SPEC_FULL.md §4.8).
//!
//! Tie-break chain mirrors the sort-key-tuple idiom seen in
//! `DrFlowerkick`-style scoring modules: build one comparable key per
//! participant, sort descending/ascending as specified, then assign dense
//! positions. The random coin-flip must be drawn once and persisted by the
//! caller (`random_tiebreak`) before this module ever sorts on it — the
//! ranker itself never calls into `rand`.

use uuid::Uuid;

#[derive(Debug, Clone, Copy)]
pub struct ScoreRow {
    pub participant_id: Uuid,
    pub total_score: f64,
    pub finals_score: f64,
    /// Minimum value ever seen across any of this participant's submitted
    /// `positions`, or `999` if they have none.
    pub best_placement: i32,
    /// A uniformly drawn real in `[0,1)`, persisted once per participant.
    pub random_tiebreak: f64,
}

/// Draws the decisive coin-flip. Called once per participant, result
/// persisted immediately so it is never re-drawn on a later query.
pub fn random_tiebreak() -> f64 {
    rand::random::<f64>()
}

fn sort_key_finals(row: &ScoreRow) -> (f64, i32, f64) {
    (-row.finals_score, row.best_placement, row.random_tiebreak)
}

fn sort_key_total(row: &ScoreRow) -> (f64, i32, f64) {
    (-row.total_score, row.best_placement, row.random_tiebreak)
}

/// With finals that started: finalists ranked by `finals_score` desc, best
/// placement asc, random asc, taking positions `1..=finalists.len()`;
/// non-finalists ranked by `total_score` desc, best placement asc, random
/// asc, taking the remaining positions.
pub fn rank_with_finals(
    finalists: &[ScoreRow],
    non_finalists: &[ScoreRow],
) -> Vec<(Uuid, i32)> {
    let mut f = finalists.to_vec();
    f.sort_by(|a, b| sort_key_finals(a).partial_cmp(&sort_key_finals(b)).unwrap());

    let mut n = non_finalists.to_vec();
    n.sort_by(|a, b| sort_key_total(a).partial_cmp(&sort_key_total(b)).unwrap());

    let mut out = Vec::with_capacity(f.len() + n.len());
    for (i, row) in f.iter().enumerate() {
        out.push((row.participant_id, (i + 1) as i32));
    }
    let offset = f.len() as i32;
    for (i, row) in n.iter().enumerate() {
        out.push((row.participant_id, offset + i as i32 + 1));
    }
    out
}

/// Without finals (or finals never started): a single sort over everyone by
/// `total_score` desc, best placement asc, random asc.
pub fn rank_without_finals(all: &[ScoreRow]) -> Vec<(Uuid, i32)> {
    let mut rows = all.to_vec();
    rows.sort_by(|a, b| sort_key_total(a).partial_cmp(&sort_key_total(b)).unwrap());
    rows.iter()
        .enumerate()
        .map(|(i, row)| (row.participant_id, i as i32 + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(total: f64, finals: f64, best: i32, rand: f64) -> ScoreRow {
        ScoreRow {
            participant_id: Uuid::new_v4(),
            total_score: total,
            finals_score: finals,
            best_placement: best,
            random_tiebreak: rand,
        }
    }

    #[test]
    fn without_finals_ranks_by_total_score_then_best_placement_then_random() {
        let a = row(10.0, 0.0, 2, 0.5);
        let b = row(10.0, 0.0, 1, 0.9);
        let c = row(5.0, 0.0, 1, 0.1);
        let ranked = rank_without_finals(&[a, b, c]);
        assert_eq!(ranked[0].0, b.participant_id);
        assert_eq!(ranked[1].0, a.participant_id);
        assert_eq!(ranked[2].0, c.participant_id);
    }

    #[test]
    fn with_finals_finalists_take_the_top_positions_regardless_of_total_score() {
        let finalist = row(1.0, 50.0, 1, 0.5);
        let non_finalist = row(1000.0, 0.0, 1, 0.5);
        let ranked = rank_with_finals(&[finalist], &[non_finalist]);
        assert_eq!(ranked[0].0, finalist.participant_id);
        assert_eq!(ranked[0].1, 1);
        assert_eq!(ranked[1].0, non_finalist.participant_id);
        assert_eq!(ranked[1].1, 2);
    }

    #[test]
    fn coin_flip_is_within_unit_interval() {
        let v = random_tiebreak();
        assert!((0.0..1.0).contains(&v));
    }
}
