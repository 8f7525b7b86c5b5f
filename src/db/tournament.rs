//! Tournament repository (§3, §5).
//!
//! Mutating methods used inside a state-machine transition accept an
//! explicit `&mut PgConnection` (via `Transaction`'s `Deref`) so the caller
//! controls the transaction boundary and the row-level lock it holds; plain
//! reads take the pool directly.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{FirstRoundStrategy, Tournament, TournamentStatus};

pub struct TournamentRepository {
    pool: PgPool,
}

const COLUMNS: &str = "id, name, creator_id, type_, capacity, total_rounds,
         current_round, regular_rounds, status,
         first_round_strategy, with_finals,
         finals_started, finals_games_count, finals_participants_count,
         lobby_maker_priority_list, registration_deadline, start_date, end_date, is_deleted,
         created_at, updated_at";

impl TournamentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        creator_id: Uuid,
        name: &str,
        capacity: i32,
        total_rounds: i32,
        first_round_strategy: FirstRoundStrategy,
        with_finals: bool,
        finals_games_count: Option<i32>,
        finals_participants_count: Option<i32>,
        lobby_maker_priority_list: &[Uuid],
        registration_deadline: Option<DateTime<Utc>>,
    ) -> Result<Tournament, AppError> {
        sqlx::query_as::<_, Tournament>(&format!(
            "INSERT INTO tournaments
                (name, creator_id, capacity, total_rounds, regular_rounds, first_round_strategy,
                 with_finals, finals_games_count, finals_participants_count,
                 lobby_maker_priority_list, registration_deadline)
             VALUES ($1, $2, $3, $4, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        ))
        .bind(name)
        .bind(creator_id)
        .bind(capacity)
        .bind(total_rounds)
        .bind(first_round_strategy)
        .bind(with_finals)
        .bind(finals_games_count)
        .bind(finals_participants_count)
        .bind(lobby_maker_priority_list)
        .bind(registration_deadline)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Tournament, AppError> {
        sqlx::query_as::<_, Tournament>(&format!(
            "SELECT {COLUMNS} FROM tournaments WHERE id = $1 AND NOT is_deleted"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("tournament not found".into()))
    }

    /// Takes the row-level lock every state-machine transition and every
    /// result ingest must hold before touching rounds/games/participants (§5).
    pub async fn lock_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Tournament, AppError> {
        sqlx::query_as::<_, Tournament>(&format!(
            "SELECT {COLUMNS} FROM tournaments WHERE id = $1 AND NOT is_deleted FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound("tournament not found".into()))
    }

    pub async fn list(
        &self,
        status: Option<TournamentStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Tournament>, AppError> {
        let rows = sqlx::query_as::<_, Tournament>(&format!(
            "SELECT {COLUMNS} FROM tournaments
             WHERE NOT is_deleted AND ($1::varchar IS NULL OR status = $1)
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        ))
        .bind(status)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update_structural(
        &self,
        id: Uuid,
        name: Option<&str>,
        capacity: Option<i32>,
        total_rounds: Option<i32>,
        first_round_strategy: Option<FirstRoundStrategy>,
        lobby_maker_priority_list: Option<&[Uuid]>,
        registration_deadline: Option<DateTime<Utc>>,
    ) -> Result<Tournament, AppError> {
        sqlx::query_as::<_, Tournament>(&format!(
            "UPDATE tournaments SET
                name = COALESCE($2, name),
                capacity = COALESCE($3, capacity),
                total_rounds = COALESCE($4, total_rounds),
                regular_rounds = COALESCE($4, regular_rounds),
                first_round_strategy = COALESCE($5, first_round_strategy),
                lobby_maker_priority_list = COALESCE($6, lobby_maker_priority_list),
                registration_deadline = COALESCE($7, registration_deadline),
                updated_at = now()
             WHERE id = $1 AND NOT is_deleted AND status = 'registration'
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(capacity)
        .bind(total_rounds)
        .bind(first_round_strategy)
        .bind(lobby_maker_priority_list)
        .bind(registration_deadline)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::InvalidState(
                "structural fields are only mutable while the tournament is in registration"
                    .into(),
            )
        })
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE tournaments SET is_deleted = TRUE, updated_at = now() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_status(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        status: TournamentStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE tournaments SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// `start_tournament`: `current_round := 1`, `status := active`, `start_date := now()`.
    pub async fn mark_started(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE tournaments SET status = 'active', current_round = 1, start_date = now(),
                updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn advance_current_round(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        new_current_round: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE tournaments SET current_round = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(new_current_round)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// `start_finals`: `total_rounds := regular_rounds + finals_games_count`,
    /// `finals_started := true`, `current_round := regular_rounds + 1`.
    pub async fn mark_finals_started(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        new_total_rounds: i32,
        new_current_round: i32,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE tournaments SET finals_started = TRUE, total_rounds = $2, current_round = $3,
                updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(new_total_rounds)
        .bind(new_current_round)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn mark_finished(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE tournaments SET status = 'finished', end_date = now(), updated_at = now()
             WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn mark_cancelled(&self, conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE tournaments SET status = 'cancelled', updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
