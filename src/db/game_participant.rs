//! Game-participant (lobby slot) repository (§3, §4.5, §4.7, §4.8).

use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::GameParticipant;

pub struct GameParticipantRepository;

const COLUMNS: &str = "id, game_id, participant_id, positions, calculated_points, is_lobby_maker";

impl GameParticipantRepository {
    pub fn new() -> Self {
        Self
    }

    /// Seats exactly one slot per `participant_id`, in the order pairing
    /// handed them over (§4.4: "writes exactly `capacity` rows for the round").
    pub async fn create_many(
        &self,
        conn: &mut PgConnection,
        game_id: Uuid,
        participant_ids: &[Uuid],
    ) -> Result<Vec<GameParticipant>, AppError> {
        let mut out = Vec::with_capacity(participant_ids.len());
        for participant_id in participant_ids {
            let row = sqlx::query_as::<_, GameParticipant>(&format!(
                "INSERT INTO game_participants (game_id, participant_id) VALUES ($1, $2)
                 RETURNING {COLUMNS}"
            ))
            .bind(game_id)
            .bind(participant_id)
            .fetch_one(&mut *conn)
            .await?;
            out.push(row);
        }
        Ok(out)
    }

    pub async fn find(
        &self,
        conn: &mut PgConnection,
        game_id: Uuid,
        participant_id: Uuid,
    ) -> Result<GameParticipant, AppError> {
        sqlx::query_as::<_, GameParticipant>(&format!(
            "SELECT {COLUMNS} FROM game_participants WHERE game_id = $1 AND participant_id = $2"
        ))
        .bind(game_id)
        .bind(participant_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("participant does not hold a slot in this game".into()))
    }

    pub async fn list_by_game(
        &self,
        conn: &mut PgConnection,
        game_id: Uuid,
    ) -> Result<Vec<GameParticipant>, AppError> {
        let rows = sqlx::query_as::<_, GameParticipant>(&format!(
            "SELECT {COLUMNS} FROM game_participants WHERE game_id = $1"
        ))
        .bind(game_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Every other filled slot in the same game, for the cross-slot conflict
    /// check (§4.5). Excludes `participant_id`'s own (possibly already-set) slot.
    pub async fn other_positions(
        &self,
        conn: &mut PgConnection,
        game_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Vec<Vec<i32>>, AppError> {
        let rows: Vec<Vec<i32>> = sqlx::query_scalar(
            "SELECT positions FROM game_participants
             WHERE game_id = $1 AND participant_id <> $2 AND positions IS NOT NULL",
        )
        .bind(game_id)
        .bind(participant_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    pub async fn set_result(
        &self,
        conn: &mut PgConnection,
        game_id: Uuid,
        participant_id: Uuid,
        positions: &[i32],
        calculated_points: f64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE game_participants SET positions = $3, calculated_points = $4
             WHERE game_id = $1 AND participant_id = $2",
        )
        .bind(game_id)
        .bind(participant_id)
        .bind(positions)
        .bind(calculated_points)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn clear_result(
        &self,
        conn: &mut PgConnection,
        game_id: Uuid,
        participant_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE game_participants SET positions = NULL, calculated_points = NULL
             WHERE game_id = $1 AND participant_id = $2",
        )
        .bind(game_id)
        .bind(participant_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Exactly one slot in a game may have `is_lobby_maker = true` (§4.3):
    /// clear every slot first, then set the chosen one in the same transaction.
    pub async fn clear_lobby_maker_flags(
        &self,
        conn: &mut PgConnection,
        game_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE game_participants SET is_lobby_maker = FALSE WHERE game_id = $1")
            .bind(game_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn set_lobby_maker_flag(
        &self,
        conn: &mut PgConnection,
        game_id: Uuid,
        participant_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE game_participants SET is_lobby_maker = TRUE
             WHERE game_id = $1 AND participant_id = $2",
        )
        .bind(game_id)
        .bind(participant_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn count_results(&self, conn: &mut PgConnection, game_id: Uuid) -> Result<i64, AppError> {
        let n: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM game_participants WHERE game_id = $1 AND positions IS NOT NULL",
        )
        .bind(game_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(n)
    }

    /// Every submitted result's `(round_number, calculated_points)` for one
    /// participant, used to recompute `total_score`/`finals_score` (§4.5).
    pub async fn scored_slots_for_participant(
        &self,
        conn: &mut PgConnection,
        participant_id: Uuid,
    ) -> Result<Vec<(i32, f64)>, AppError> {
        let rows: Vec<(i32, f64)> = sqlx::query_as(
            "SELECT r.round_number, gp.calculated_points
             FROM game_participants gp
             JOIN games g ON g.id = gp.game_id
             JOIN rounds r ON r.id = g.round_id
             WHERE gp.participant_id = $1 AND gp.calculated_points IS NOT NULL",
        )
        .bind(participant_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Minimum value ever seen across any of this participant's `positions`,
    /// or `999` if none (§4.8 ranker tie-break).
    pub async fn best_placement_for_participant(
        &self,
        conn: &mut PgConnection,
        participant_id: Uuid,
    ) -> Result<i32, AppError> {
        let best: Option<i32> = sqlx::query_scalar(
            "SELECT min(p) FROM game_participants gp, unnest(gp.positions) AS p
             WHERE gp.participant_id = $1",
        )
        .bind(participant_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(best.unwrap_or(999))
    }

    /// Actual finalists: distinct participant ids seated in any finals game
    /// (`round_number > regular_rounds`) — survives swaps (§4.7).
    pub async fn actual_finalist_participant_ids(
        &self,
        conn: &mut PgConnection,
        tournament_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError> {
        let rows: Vec<Uuid> = sqlx::query_scalar(
            "SELECT DISTINCT gp.participant_id
             FROM game_participants gp
             JOIN games g ON g.id = gp.game_id
             JOIN rounds r ON r.id = g.round_id
             JOIN tournaments t ON t.id = g.tournament_id
             WHERE g.tournament_id = $1 AND r.round_number > t.regular_rounds",
        )
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    pub async fn any_finals_result_submitted(
        &self,
        conn: &mut PgConnection,
        tournament_id: Uuid,
    ) -> Result<bool, AppError> {
        let n: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM game_participants gp
             JOIN games g ON g.id = gp.game_id
             JOIN rounds r ON r.id = g.round_id
             JOIN tournaments t ON t.id = g.tournament_id
             WHERE g.tournament_id = $1 AND r.round_number > t.regular_rounds
               AND gp.positions IS NOT NULL",
        )
        .bind(tournament_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(n > 0)
    }

    pub async fn has_round_result(
        &self,
        conn: &mut PgConnection,
        participant_id: Uuid,
        round_number: i32,
    ) -> Result<bool, AppError> {
        let n: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM game_participants gp
             JOIN games g ON g.id = gp.game_id
             JOIN rounds r ON r.id = g.round_id
             WHERE gp.participant_id = $1 AND r.round_number = $2 AND gp.positions IS NOT NULL",
        )
        .bind(participant_id)
        .bind(round_number)
        .fetch_one(&mut *conn)
        .await?;
        Ok(n > 0)
    }

    /// Finalist swap (§4.7): rewrites `participant_id` on every finals-game
    /// slot that currently belongs to `from`, to `to`. The `is_lobby_maker`
    /// flag travels with the row; the game's `lobby_maker_user_id` is left
    /// untouched (see DESIGN.md open-question decision).
    pub async fn rewrite_finalist(
        &self,
        conn: &mut PgConnection,
        tournament_id: Uuid,
        from_participant_id: Uuid,
        to_participant_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE game_participants gp
             SET participant_id = $3
             FROM games g
             JOIN rounds r ON r.id = g.round_id
             JOIN tournaments t ON t.id = g.tournament_id
             WHERE gp.game_id = g.id
               AND g.tournament_id = $1
               AND r.round_number > t.regular_rounds
               AND gp.participant_id = $2",
        )
        .bind(tournament_id)
        .bind(from_participant_id)
        .bind(to_participant_id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

impl Default for GameParticipantRepository {
    fn default() -> Self {
        Self::new()
    }
}
