//! Audit log repository (§3, §4.10). Append-only: no update or delete is exposed.

use sqlx::PgConnection;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::LogRecord;

pub struct LogRepository;

impl LogRepository {
    pub fn new() -> Self {
        Self
    }

    /// Inserts one record within the caller's open transaction, before
    /// commit (§4.10: "writes one log record before the transaction commits").
    pub async fn insert(&self, conn: &mut PgConnection, record: &LogRecord) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO logs
                (tournament_id, game_id, actor_user_id, actor_tag_snapshot, actor_role_snapshot,
                 action_type, description, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(record.tournament_id)
        .bind(record.game_id)
        .bind(record.actor_user_id)
        .bind(&record.actor_tag_snapshot)
        .bind(record.actor_role_snapshot)
        .bind(&record.action_type)
        .bind(&record.description)
        .bind(record.created_at)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    pub async fn list_for_tournament(
        &self,
        pool: &sqlx::PgPool,
        tournament_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<LogRecord>, AppError> {
        let rows = sqlx::query_as::<_, LogRecord>(
            "SELECT id, tournament_id, game_id, actor_user_id, actor_tag_snapshot,
                    actor_role_snapshot, action_type, description, created_at
             FROM logs WHERE tournament_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3",
        )
        .bind(tournament_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;
        Ok(rows)
    }
}

impl Default for LogRepository {
    fn default() -> Self {
        Self::new()
    }
}
