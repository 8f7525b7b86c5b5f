//! Activity heartbeat (SPEC_FULL.md §4.11).
//!
//! Every authenticated HTTP request and every received WebSocket frame
//! touches `users.last_seen`. Detached so a slow or failing update never
//! delays or fails the request/frame that triggered it (§7: heartbeat
//! failures never fail the underlying request).

use sqlx::PgPool;
use uuid::Uuid;

/// Spawns a fire-and-forget task updating `last_seen`. Must be called after
/// the request's own transaction has already committed, so it never
/// contends with the row-level locks taken by the state machine (§5).
pub fn touch_last_seen(pool: PgPool, user_id: Uuid) {
    tokio::spawn(async move {
        if let Err(err) = sqlx::query("UPDATE users SET last_seen = now() WHERE id = $1")
            .bind(user_id)
            .execute(&pool)
            .await
        {
            tracing::warn!(%user_id, error = %err, "heartbeat update failed");
        }
    });
}
