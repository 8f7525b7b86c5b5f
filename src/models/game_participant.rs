use serde::Serialize;
use uuid::Uuid;

/// A participant's slot within a single game (lobby).
///
/// `positions` is a sorted, non-empty, consecutive sequence of ints in `[1,8]`
/// when set (shared placements share the same sequence across slots), or
/// `None` while the result has not been reported yet.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct GameParticipant {
    pub id: Uuid,
    pub game_id: Uuid,
    pub participant_id: Uuid,
    pub positions: Option<Vec<i32>>,
    pub calculated_points: Option<f64>,
    pub is_lobby_maker: bool,
}
