use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::RoundStatus;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Round {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub round_number: i32,
    pub status: RoundStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}
