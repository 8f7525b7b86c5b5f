use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::User;

pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, external_id, tag, display_name, rating, role, active, last_seen,
                    favorite_lobby_makers, jti_version, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    pub async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, external_id, tag, display_name, rating, role, active, last_seen,
                    favorite_lobby_makers, jti_version, created_at, updated_at
             FROM users WHERE external_id = $1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Creates the user on first OAuth login, or refreshes tag/display_name
    /// on every subsequent one.
    pub async fn upsert_from_oauth(
        &self,
        external_id: &str,
        tag: &str,
        display_name: &str,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (external_id, tag, display_name)
             VALUES ($1, $2, $3)
             ON CONFLICT (external_id)
             DO UPDATE SET tag = EXCLUDED.tag, display_name = EXCLUDED.display_name, updated_at = now()
             RETURNING id, external_id, tag, display_name, rating, role, active, last_seen,
                       favorite_lobby_makers, jti_version, created_at, updated_at",
        )
        .bind(external_id)
        .bind(tag)
        .bind(display_name)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    /// Invalidates every token issued before now for this user (logout
    /// everywhere); used by the revocation mechanism described in §9.
    pub async fn bump_jti_version(&self, user_id: Uuid) -> Result<i32, AppError> {
        sqlx::query_scalar::<_, i32>(
            "UPDATE users SET jti_version = jti_version + 1, updated_at = now()
             WHERE id = $1 RETURNING jti_version",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".into()))
    }

    /// Replaces the user's global favorite-lobby-maker list. Rejects
    /// duplicates (§3: "duplicates forbidden").
    pub async fn update_favorite_lobby_makers(
        &self,
        user_id: Uuid,
        favorites: Vec<Uuid>,
    ) -> Result<User, AppError> {
        let mut deduped = favorites.clone();
        deduped.dedup();
        let mut sorted_check = favorites.clone();
        sorted_check.sort_unstable();
        sorted_check.dedup();
        if sorted_check.len() != favorites.len() {
            return Err(AppError::Invalid(
                "favorite_lobby_makers must not contain duplicates".into(),
            ));
        }

        sqlx::query("UPDATE users SET favorite_lobby_makers = $1, updated_at = now() WHERE id = $2")
            .bind(&favorites)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        self.find_by_id(user_id).await
    }
}
