//! Round repository (§3, §4.6).

use chrono::Utc;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Round, RoundStatus};

pub struct RoundRepository {
    pool: PgPool,
}

const COLUMNS: &str = "id, tournament_id, round_number, status, started_at, completed_at";

impl RoundRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the next round and immediately transitions it to `active`
    /// (§4.6: every new round is created and activated in the same transition).
    pub async fn create_active(
        &self,
        conn: &mut PgConnection,
        tournament_id: Uuid,
        round_number: i32,
    ) -> Result<Round, AppError> {
        sqlx::query_as::<_, Round>(&format!(
            "INSERT INTO rounds (tournament_id, round_number, status, started_at)
             VALUES ($1, $2, 'active', now())
             RETURNING {COLUMNS}"
        ))
        .bind(tournament_id)
        .bind(round_number)
        .fetch_one(&mut *conn)
        .await
        .map_err(AppError::from)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Round, AppError> {
        sqlx::query_as::<_, Round>(&format!("SELECT {COLUMNS} FROM rounds WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("round not found".into()))
    }

    pub async fn find_by_number(
        &self,
        tournament_id: Uuid,
        round_number: i32,
    ) -> Result<Round, AppError> {
        sqlx::query_as::<_, Round>(&format!(
            "SELECT {COLUMNS} FROM rounds WHERE tournament_id = $1 AND round_number = $2"
        ))
        .bind(tournament_id)
        .bind(round_number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("round not found".into()))
    }

    pub async fn find_by_number_tx(
        &self,
        conn: &mut PgConnection,
        tournament_id: Uuid,
        round_number: i32,
    ) -> Result<Round, AppError> {
        sqlx::query_as::<_, Round>(&format!(
            "SELECT {COLUMNS} FROM rounds WHERE tournament_id = $1 AND round_number = $2"
        ))
        .bind(tournament_id)
        .bind(round_number)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("round not found".into()))
    }

    pub async fn list(&self, tournament_id: Uuid) -> Result<Vec<Round>, AppError> {
        let rows = sqlx::query_as::<_, Round>(&format!(
            "SELECT {COLUMNS} FROM rounds WHERE tournament_id = $1 ORDER BY round_number"
        ))
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn mark_completed(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE rounds SET status = 'completed', completed_at = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Whether every game belonging to this round is `completed`. Used by
    /// `can_advance_round` / `can_finish` preconditions.
    pub async fn is_fully_completed(
        &self,
        conn: &mut PgConnection,
        round_id: Uuid,
    ) -> Result<bool, AppError> {
        let incomplete: i64 = sqlx::query_scalar(
            "SELECT count(*) FROM games WHERE round_id = $1 AND status <> 'completed'",
        )
        .bind(round_id)
        .fetch_one(&mut *conn)
        .await?;
        let total: i64 = sqlx::query_scalar("SELECT count(*) FROM games WHERE round_id = $1")
            .bind(round_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(total > 0 && incomplete == 0)
    }

    pub async fn status(&self, round_id: Uuid) -> Result<RoundStatus, AppError> {
        sqlx::query_scalar::<_, RoundStatus>("SELECT status FROM rounds WHERE id = $1")
            .bind(round_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("round not found".into()))
    }
}
