//! String-backed enums shared across the domain and the wire format.
//!
//! Each derives `sqlx::Type` over a `varchar` column (the donor's pattern for
//! enum-as-string persistence, see `db/user/*.rs`) plus `Serialize`/`Deserialize`
//! for the HTTP layer.

use serde::{Deserialize, Serialize};

/// Total order over platform roles: `user < premium < admin < super_admin`.
/// Variant declaration order IS the total order (derived `Ord`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Premium,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn at_least(&self, min: Role) -> bool {
        *self >= min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TournamentType {
    Swiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    Registration,
    Active,
    Finished,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FirstRoundStrategy {
    Random,
    Balanced,
    StrongVsStrong,
}

impl Default for FirstRoundStrategy {
    fn default() -> Self {
        FirstRoundStrategy::Random
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Pending,
    Active,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Pending,
    Active,
    Completed,
}
