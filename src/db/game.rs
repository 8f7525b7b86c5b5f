//! Game (lobby) repository (§3, §4.4, §4.5).

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Game, GameStatus};

pub struct GameRepository {
    pool: PgPool,
}

const COLUMNS: &str =
    "id, tournament_id, round_id, game_number, status, lobby_maker_user_id, started_at, finished_at";

impl GameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `capacity / 8` empty games for a freshly-activated round.
    pub async fn create_for_round(
        &self,
        conn: &mut PgConnection,
        tournament_id: Uuid,
        round_id: Uuid,
        count: i32,
    ) -> Result<Vec<Game>, AppError> {
        let mut games = Vec::with_capacity(count as usize);
        for game_number in 1..=count {
            let game = sqlx::query_as::<_, Game>(&format!(
                "INSERT INTO games (tournament_id, round_id, game_number, status, started_at)
                 VALUES ($1, $2, $3, 'active', now())
                 RETURNING {COLUMNS}"
            ))
            .bind(tournament_id)
            .bind(round_id)
            .bind(game_number)
            .fetch_one(&mut *conn)
            .await?;
            games.push(game);
        }
        Ok(games)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Game, AppError> {
        sqlx::query_as::<_, Game>(&format!("SELECT {COLUMNS} FROM games WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("game not found".into()))
    }

    /// Locks the game row for the duration of a result-ingest transaction
    /// (§5: "result ingest takes a `for update` on the game row").
    pub async fn lock_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Game, AppError> {
        sqlx::query_as::<_, Game>(&format!(
            "SELECT {COLUMNS} FROM games WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("game not found".into()))
    }

    pub async fn list_by_round(&self, round_id: Uuid) -> Result<Vec<Game>, AppError> {
        let rows = sqlx::query_as::<_, Game>(&format!(
            "SELECT {COLUMNS} FROM games WHERE round_id = $1 ORDER BY game_number"
        ))
        .bind(round_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_round_tx(
        &self,
        conn: &mut PgConnection,
        round_id: Uuid,
    ) -> Result<Vec<Game>, AppError> {
        let rows = sqlx::query_as::<_, Game>(&format!(
            "SELECT {COLUMNS} FROM games WHERE round_id = $1 ORDER BY game_number"
        ))
        .bind(round_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Lists every finals game (round_number > regular_rounds) for a tournament.
    pub async fn list_finals_games(
        &self,
        conn: &mut PgConnection,
        tournament_id: Uuid,
    ) -> Result<Vec<Game>, AppError> {
        let rows = sqlx::query_as::<_, Game>(&format!(
            "SELECT g.id, g.tournament_id, g.round_id, g.game_number, g.status,
                    g.lobby_maker_user_id, g.started_at, g.finished_at
             FROM games g
             JOIN rounds r ON r.id = g.round_id
             JOIN tournaments t ON t.id = g.tournament_id
             WHERE g.tournament_id = $1 AND r.round_number > t.regular_rounds
             ORDER BY r.round_number, g.game_number"
        ))
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    pub async fn set_status(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: GameStatus,
    ) -> Result<(), AppError> {
        let finished_at_clause = match status {
            GameStatus::Completed => "finished_at = now()",
            _ => "finished_at = finished_at",
        };
        sqlx::query(&format!("UPDATE games SET status = $2, {finished_at_clause} WHERE id = $1"))
            .bind(id)
            .bind(status)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn set_lobby_maker(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        lobby_maker_user_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE games SET lobby_maker_user_id = $2 WHERE id = $1")
            .bind(id)
            .bind(lobby_maker_user_id)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}
