use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::Role;

/// Append-only audit record. Actor tag/role are snapshotted at write time so
/// the log stays readable after the actor's own profile changes (§4.10).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LogRecord {
    pub id: Uuid,
    pub tournament_id: Uuid,
    pub game_id: Option<Uuid>,
    pub actor_user_id: Uuid,
    pub actor_tag_snapshot: String,
    pub actor_role_snapshot: Role,
    pub action_type: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
