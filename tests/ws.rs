// WebSocket fan-out coverage (SPEC_FULL.md §8 scenario 6).
// Run with: `cargo test --test ws`

#[path = "common/mod.rs"]
mod common;

use futures_util::{SinkExt, Stream, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tourney_engine_be::models::Role;

async fn next_event_of_type(
    socket: &mut (impl Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin),
    type_name: &str,
) -> Value {
    loop {
        let frame = tokio::time::timeout(std::time::Duration::from_secs(5), socket.next())
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {type_name}"))
            .expect("socket closed")
            .expect("ws error");
        let Message::Text(text) = frame else { continue };
        let event: Value = serde_json::from_str(&text).unwrap();
        if event["type"] == type_name {
            return event;
        }
    }
}

/// A user participating in `T1` and a bystander in no tournament both
/// receive `next_round_created` on `T1`'s advance: the event is broadcast to
/// all connections, not scoped to tournament membership (§9 design note).
#[tokio::test]
async fn next_round_created_reaches_every_open_connection() {
    let app = common::spawn_app_with_container().await;
    let client = reqwest::Client::new();
    let factory = app.factory();

    let creator_id = factory.create_user("creator", "user", None).await.unwrap();
    let creator_token = app.generate_jwt_for_user(creator_id, "creator", Role::User).unwrap();

    let create_resp = client
        .post(format!("{}/auth/tournaments", app.base_url))
        .bearer_auth(&creator_token)
        .json(&json!({ "name": "Fan Out", "capacity": 8, "totalRounds": 2 }))
        .send()
        .await
        .unwrap();
    let tournament: Value = create_resp.json().await.unwrap();
    let tournament_id = tournament["id"].as_str().unwrap().to_string();

    let mut member_token = String::new();
    for i in 0..8 {
        let user_id = factory.create_user(&format!("p{i}"), "user", None).await.unwrap();
        let token = app.generate_jwt_for_user(user_id, &format!("p{i}"), Role::User).unwrap();
        client
            .post(format!("{}/auth/tournaments/{}/join", app.base_url, tournament_id))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        if i == 0 {
            member_token = token;
        }
    }

    client
        .post(format!("{}/auth/tournaments/{}/start", app.base_url, tournament_id))
        .bearer_auth(&creator_token)
        .send()
        .await
        .unwrap();

    let bystander_id = factory.create_user("bystander", "user", None).await.unwrap();
    let bystander_token = app.generate_jwt_for_user(bystander_id, "bystander", Role::User).unwrap();

    let ws_base = app.base_url.replacen("http://", "ws://", 1);
    let (mut member_ws, _) = connect_async(format!("{}/ws?token={}", ws_base, member_token))
        .await
        .expect("member connect failed");
    let (mut bystander_ws, _) = connect_async(format!("{}/ws?token={}", ws_base, bystander_token))
        .await
        .expect("bystander connect failed");

    // Drain each connection's `hello` frame.
    let _ = member_ws.next().await;
    let _ = bystander_ws.next().await;

    // Submit all 8 round-1 results so the round can advance.
    let games: Value = client
        .get(format!("{}/api/tournaments/{}/rounds/1/games", app.base_url, tournament_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let slots = games["games"][0]["slots"].as_array().unwrap();
    for (i, slot) in slots.iter().enumerate() {
        let participant_id = slot["participant_id"].as_str().unwrap();
        client
            .put(format!(
                "{}/auth/games/{}/participants/{}/position",
                app.base_url,
                games["games"][0]["id"].as_str().unwrap(),
                participant_id
            ))
            .bearer_auth(&creator_token)
            .json(&json!([i as i32 + 1]))
            .send()
            .await
            .unwrap();
    }

    client
        .post(format!("{}/auth/tournaments/{}/next-round", app.base_url, tournament_id))
        .bearer_auth(&creator_token)
        .send()
        .await
        .unwrap();

    // The tournament member also observes `game_result_updated` and
    // `game_completed` broadcasts from the result submissions above; skip
    // past those to find the `next_round_created` frame triggered by advance.
    for socket in [&mut member_ws, &mut bystander_ws] {
        let event = next_event_of_type(socket, "next_round_created").await;
        assert_eq!(event["tournament_id"], tournament_id);
        assert_eq!(event["round_number"], 2);
    }

    member_ws.close(None).await.ok();
    bystander_ws.close(None).await.ok();
    app.stop().await;
}
