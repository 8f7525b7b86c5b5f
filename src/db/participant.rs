//! Participant (tournament membership) repository (§3, §4.6, §4.7).

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Participant;

pub struct ParticipantRepository {
    pool: PgPool,
}

const COLUMNS: &str =
    "id, tournament_id, user_id, total_score, finals_score, final_position, joined_at";

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn join(
        &self,
        conn: &mut PgConnection,
        tournament_id: Uuid,
        user_id: Uuid,
    ) -> Result<Participant, AppError> {
        sqlx::query_as::<_, Participant>(&format!(
            "INSERT INTO participants (tournament_id, user_id) VALUES ($1, $2)
             RETURNING {COLUMNS}"
        ))
        .bind(tournament_id)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("already joined this tournament".into())
            }
            other => AppError::from(other),
        })
    }

    /// Hard delete — §9 decision: rejoining after leaving starts fresh.
    pub async fn leave(
        &self,
        conn: &mut PgConnection,
        tournament_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM participants WHERE tournament_id = $1 AND user_id = $2")
            .bind(tournament_id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("not a participant of this tournament".into()));
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Participant, AppError> {
        sqlx::query_as::<_, Participant>(&format!("SELECT {COLUMNS} FROM participants WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("participant not found".into()))
    }

    pub async fn find_by_id_tx(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Participant, AppError> {
        sqlx::query_as::<_, Participant>(&format!("SELECT {COLUMNS} FROM participants WHERE id = $1"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound("participant not found".into()))
    }

    pub async fn find_by_user(
        &self,
        tournament_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Participant>, AppError> {
        let row = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {COLUMNS} FROM participants WHERE tournament_id = $1 AND user_id = $2"
        ))
        .bind(tournament_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn count(&self, tournament_id: Uuid) -> Result<i64, AppError> {
        let n: i64 = sqlx::query_scalar("SELECT count(*) FROM participants WHERE tournament_id = $1")
            .bind(tournament_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(n)
    }

    pub async fn count_tx(&self, conn: &mut PgConnection, tournament_id: Uuid) -> Result<i64, AppError> {
        let n: i64 = sqlx::query_scalar("SELECT count(*) FROM participants WHERE tournament_id = $1")
            .bind(tournament_id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(n)
    }

    pub async fn list(&self, tournament_id: Uuid) -> Result<Vec<Participant>, AppError> {
        let rows = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {COLUMNS} FROM participants WHERE tournament_id = $1 ORDER BY joined_at"
        ))
        .bind(tournament_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_tx(
        &self,
        conn: &mut PgConnection,
        tournament_id: Uuid,
    ) -> Result<Vec<Participant>, AppError> {
        let rows = sqlx::query_as::<_, Participant>(&format!(
            "SELECT {COLUMNS} FROM participants WHERE tournament_id = $1 ORDER BY joined_at"
        ))
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// The user ids currently holding a membership in `tournament_id` — used
    /// by `ws::core::manager::broadcast_to_tournament`.
    pub async fn list_user_ids(&self, tournament_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let rows: Vec<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM participants WHERE tournament_id = $1")
                .bind(tournament_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    /// Tournaments in which `user_id` is a participant and which are still
    /// `active` — sent in the WebSocket hello frame (§4.9).
    pub async fn list_active_tournament_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let rows: Vec<Uuid> = sqlx::query_scalar(
            "SELECT t.id FROM tournaments t
             JOIN participants p ON p.tournament_id = t.id
             WHERE p.user_id = $1 AND t.status = 'active' AND NOT t.is_deleted",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Participants joined with their user's rating, for the pairing
    /// strategies (§4.4) to build a `Seed` list from.
    pub async fn list_for_pairing(
        &self,
        conn: &mut PgConnection,
        tournament_id: Uuid,
    ) -> Result<Vec<(Uuid, Uuid, i32, f64)>, AppError> {
        let rows: Vec<(Uuid, Uuid, i32, f64)> = sqlx::query_as(
            "SELECT p.id, p.user_id, COALESCE(u.rating, 0), p.total_score
             FROM participants p
             JOIN users u ON u.id = p.user_id
             WHERE p.tournament_id = $1
             ORDER BY p.joined_at",
        )
        .bind(tournament_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Finalist participants joined with rating and `finals_score`, for
    /// Swiss re-pairing of finals rounds beyond the first (§4.6).
    pub async fn list_finalists_for_pairing(
        &self,
        conn: &mut PgConnection,
        participant_ids: &[Uuid],
    ) -> Result<Vec<(Uuid, Uuid, i32, f64)>, AppError> {
        let rows: Vec<(Uuid, Uuid, i32, f64)> = sqlx::query_as(
            "SELECT p.id, p.user_id, COALESCE(u.rating, 0), p.finals_score
             FROM participants p
             JOIN users u ON u.id = p.user_id
             WHERE p.id = ANY($1)
             ORDER BY p.joined_at",
        )
        .bind(participant_ids)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    pub async fn update_scores(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        total_score: f64,
        finals_score: f64,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE participants SET total_score = $2, finals_score = $3 WHERE id = $1")
            .bind(id)
            .bind(total_score)
            .bind(finals_score)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    pub async fn set_final_position(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
        final_position: i32,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE participants SET final_position = $2 WHERE id = $1")
            .bind(id)
            .bind(final_position)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }

    /// Pre-finals participant swap (§4.7): rewrites the owning user id,
    /// keeping the participant row's id (and therefore every
    /// `GameParticipant` row referencing it) stable.
    pub async fn swap_user(
        &self,
        conn: &mut PgConnection,
        participant_id: Uuid,
        new_user_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE participants SET user_id = $2 WHERE id = $1")
            .bind(participant_id)
            .bind(new_user_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AppError::Conflict("target user is already a participant".into())
                }
                other => AppError::from(other),
            })?;
        Ok(())
    }
}
