use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Participant {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub user_id: Uuid,
    pub total_score: f64,
    pub finals_score: f64,
    pub final_position: Option<i32>,
    pub joined_at: DateTime<Utc>,
}
