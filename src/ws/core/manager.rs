//! Connection registry and broadcast primitives (SPEC_FULL.md §4.9).
//!
//! Keyed by a per-connection id so one user can hold several simultaneous
//! connections; `ConnectionIndicesInner::by_user` / `by_tournament` resolve
//! a user or tournament to the connection ids currently serving it.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::SinkExt;
use serde::Serialize;
use uuid::Uuid;

use crate::db::participant::ParticipantRepository;
use crate::state::{AppState, ConnectionInfo};

/// Server sends a ping after this much client silence.
pub const KEEPALIVE_PING_AFTER: Duration = Duration::from_secs(5);
/// Connection is closed if no client traffic arrives within this long.
pub const KEEPALIVE_CLOSE_AFTER: Duration = Duration::from_secs(60);

/// Registers a new connection and returns its id. Does not send the hello
/// frame — that is the caller's job once it has gathered the user's active
/// tournaments.
pub async fn connect(state: &AppState, user_id: Uuid, sender: Arc<ConnectionInfo>) -> Uuid {
    let connection_id = Uuid::new_v4();
    state
        .connections
        .lock()
        .await
        .insert(connection_id, sender);

    let mut indices = state.indices.lock().await;
    indices
        .by_user
        .entry(user_id)
        .or_default()
        .insert(connection_id);

    connection_id
}

/// Also tracks a connection against a tournament so `broadcast_to_tournament`
/// can reach it without a fresh DB lookup on every event.
pub async fn associate_tournament(state: &AppState, connection_id: Uuid, tournament_id: Uuid) {
    state
        .indices
        .lock()
        .await
        .by_tournament
        .entry(tournament_id)
        .or_default()
        .insert(connection_id);
}

pub async fn disconnect(state: &AppState, user_id: Uuid, connection_id: Uuid) {
    state.connections.lock().await.remove(&connection_id);

    let mut indices = state.indices.lock().await;
    if let Some(set) = indices.by_user.get_mut(&user_id) {
        set.remove(&connection_id);
        if set.is_empty() {
            indices.by_user.remove(&user_id);
        }
    }
    for set in indices.by_tournament.values_mut() {
        set.remove(&connection_id);
    }
    indices.by_tournament.retain(|_, set| !set.is_empty());
}

async fn send_raw(state: &AppState, connection_id: Uuid, json: &str) {
    let conn = { state.connections.lock().await.get(&connection_id).cloned() };
    let Some(conn) = conn else { return };
    let mut sender = conn.sender.lock().await;
    if sender.send(Message::Text(json.to_string().into())).await.is_err() {
        drop(sender);
        disconnect(state, conn.user_id, connection_id).await;
    }
}

/// Best-effort delivery to every connection of `user_id`. A transport error
/// disconnects only the faulting connection.
pub async fn send_to_user<M: Serialize>(state: &AppState, user_id: Uuid, msg: &M) {
    let Ok(json) = serde_json::to_string(msg) else {
        return;
    };
    let connection_ids: Vec<Uuid> = {
        let indices = state.indices.lock().await;
        indices
            .by_user
            .get(&user_id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    };
    for connection_id in connection_ids {
        send_raw(state, connection_id, &json).await;
    }
}

pub async fn broadcast_to_users<M: Serialize>(state: &AppState, user_ids: &[Uuid], msg: &M) {
    for user_id in user_ids {
        send_to_user(state, *user_id, msg).await;
    }
}

/// Resolves the tournament's participant user ids and fans out to all of
/// them.
pub async fn broadcast_to_tournament<M: Serialize>(
    state: &AppState,
    participants: &ParticipantRepository,
    tournament_id: Uuid,
    msg: &M,
) -> Result<(), crate::errors::AppError> {
    let user_ids = participants.list_user_ids(tournament_id).await?;
    broadcast_to_users(state, &user_ids, msg).await;
    Ok(())
}

/// Delivers to every registered connection regardless of membership.
pub async fn broadcast_to_all<M: Serialize>(state: &AppState, msg: &M) {
    let Ok(json) = serde_json::to_string(msg) else {
        return;
    };
    let connection_ids: Vec<Uuid> = state.connections.lock().await.keys().copied().collect();
    for connection_id in connection_ids {
        send_raw(state, connection_id, &json).await;
    }
}
