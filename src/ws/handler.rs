//! The single `/ws?token=` duplex endpoint (SPEC_FULL.md §4.9), replacing
//! the donor's per-lobby-path handler with one universal per-user
//! connection.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State, ws::Message, ws::WebSocket, ws::WebSocketUpgrade},
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::interval;

use crate::auth::jwt::decode_token;
use crate::db::participant::ParticipantRepository;
use crate::db::user::UserRepository;
use crate::domain::heartbeat;
use crate::state::{AppState, ConnectionInfo};
use crate::ws::core::manager::{self, KEEPALIVE_CLOSE_AFTER, KEEPALIVE_PING_AFTER};
use crate::ws::events::Event;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub token: String,
}

pub async fn ws_upgrade(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, query.token))
}

async fn handle_socket(socket: WebSocket, state: AppState, token: String) {
    let (sink, mut stream) = socket.split();
    let sink = Arc::new(Mutex::new(sink));

    let claims = match decode_token(&token, &state.config.jwt_secret) {
        Ok(c) => c,
        Err(_) => {
            send_error_and_close(sink, "unauthorized", "invalid or expired token").await;
            return;
        }
    };

    let users = UserRepository::new(state.db.clone());
    let user = match users.find_by_id(claims.user_id()).await {
        Ok(u) if u.active && u.jti_version == claims.jti_version => u,
        _ => {
            send_error_and_close(sink, "unauthorized", "token no longer valid").await;
            return;
        }
    };

    let participants = ParticipantRepository::new(state.db.clone());
    let active_tournament_ids = match participants.list_active_tournament_ids(user.id).await {
        Ok(ids) => ids,
        Err(_) => Vec::new(),
    };

    let conn_info = Arc::new(ConnectionInfo {
        user_id: user.id,
        sender: sink,
    });
    let connection_id = manager::connect(&state, user.id, conn_info.clone()).await;
    for tournament_id in &active_tournament_ids {
        manager::associate_tournament(&state, connection_id, *tournament_id).await;
    }

    let hello = Event::Hello {
        user_id: user.id,
        active_tournament_ids,
        timestamp: chrono::Utc::now(),
    };
    crate::ws::core::connection::send_json(&conn_info, &hello)
        .await
        .ok();

    let mut keepalive = interval(KEEPALIVE_PING_AFTER);
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {
                        last_activity = Instant::now();
                        heartbeat::touch_last_seen(state.db.clone(), user.id);
                    }
                    Some(Err(_)) => break,
                }
            }
            _ = keepalive.tick() => {
                let idle = last_activity.elapsed();
                if idle >= KEEPALIVE_CLOSE_AFTER {
                    break;
                }
                if idle >= KEEPALIVE_PING_AFTER {
                    let mut guard = conn_info.sender.lock().await;
                    if guard.send(Message::Ping(Vec::new().into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    manager::disconnect(&state, user.id, connection_id).await;
}

async fn send_error_and_close(
    sink: Arc<Mutex<futures::stream::SplitSink<WebSocket, Message>>>,
    error_type: &str,
    message: &str,
) {
    let frame = Event::Error {
        error_type: error_type.to_string(),
        message: message.to_string(),
        timestamp: chrono::Utc::now(),
    };
    if let Ok(json) = serde_json::to_string(&frame) {
        let mut guard = sink.lock().await;
        let _ = guard.send(Message::Text(json.into())).await;
        let _ = guard.close().await;
    }
}
