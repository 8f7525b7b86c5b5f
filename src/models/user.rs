use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::Role;

/// A platform user, as consumed from the external identity provider and
/// enriched with the few fields this service owns (role, favorites, presence).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub tag: String,
    pub display_name: String,
    pub rating: Option<i32>,
    pub role: Role,
    pub active: bool,
    pub last_seen: Option<DateTime<Utc>>,
    /// Ordered, duplicate-free list of user ids this user favors as lobby makers.
    pub favorite_lobby_makers: Vec<Uuid>,
    pub jti_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// PII visible only to the user themselves, the tournament creator, and admins
/// (§4.2 "Reading participant PII").
#[derive(Debug, Clone, Serialize)]
pub struct UserPublic {
    pub id: Uuid,
    pub tag: String,
    pub display_name: String,
    pub role: Role,
}

impl From<User> for UserPublic {
    fn from(u: User) -> Self {
        UserPublic {
            id: u.id,
            tag: u.tag,
            display_name: u.display_name,
            role: u.role,
        }
    }
}
