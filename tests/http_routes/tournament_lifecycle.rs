use reqwest::Client;
use serde_json::{Value, json};
use tourney_engine_be::models::Role;
use uuid::Uuid;

/// 8-player, 3-round, no finals (SPEC_FULL.md §8 scenario 1): create, join 8,
/// start, submit `[1]..[8]` three times over, finish, and check the
/// `final_position` multiset is exactly `{1..8}`.
#[tokio::test]
async fn eight_player_three_round_no_finals() {
    let app = crate::common::spawn_app_with_container().await;
    let client = Client::new();
    let factory = app.factory();

    let creator_id = factory.create_user("creator", "user", None).await.unwrap();
    let creator_token = app
        .generate_jwt_for_user(creator_id, "creator", Role::User)
        .unwrap();

    let create_resp = client
        .post(format!("{}/auth/tournaments", app.base_url))
        .bearer_auth(&creator_token)
        .json(&json!({
            "name": "League Night",
            "capacity": 8,
            "totalRounds": 3,
            "firstRoundStrategy": "random",
            "withFinals": false,
        }))
        .send()
        .await
        .expect("create request failed");
    assert!(create_resp.status().is_success(), "create failed: {:?}", create_resp.text().await);
    let tournament: Value = create_resp.json().await.unwrap();
    let tournament_id = tournament["id"].as_str().unwrap().to_string();

    // Eight participants join, including the creator as a player.
    let mut users = Vec::new();
    for i in 0..8 {
        let user_id = factory.create_user(&format!("player{i}"), "user", None).await.unwrap();
        let token = app.generate_jwt_for_user(user_id, &format!("player{i}"), Role::User).unwrap();
        let resp = client
            .post(format!("{}/auth/tournaments/{}/join", app.base_url, tournament_id))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success(), "join failed: {:?}", resp.text().await);
        users.push((user_id, token));
    }

    let start_resp = client
        .post(format!("{}/auth/tournaments/{}/start", app.base_url, tournament_id))
        .bearer_auth(&creator_token)
        .send()
        .await
        .unwrap();
    assert!(start_resp.status().is_success(), "start failed: {:?}", start_resp.text().await);

    for round_number in 1..=3 {
        let games_resp = client
            .get(format!(
                "{}/api/tournaments/{}/rounds/{}/games",
                app.base_url, tournament_id, round_number
            ))
            .send()
            .await
            .unwrap();
        assert!(games_resp.status().is_success());
        let games_view: Value = games_resp.json().await.unwrap();
        let games = games_view["games"].as_array().unwrap();
        assert_eq!(games.len(), 1, "8-player capacity plays one game per round");

        let game = &games[0];
        let game_id = game["id"].as_str().unwrap();
        let slots = game["slots"].as_array().unwrap();
        assert_eq!(slots.len(), 8);

        for (i, slot) in slots.iter().enumerate() {
            let participant_id = slot["participant_id"].as_str().unwrap();
            let resp = client
                .put(format!(
                    "{}/auth/games/{}/participants/{}/position",
                    app.base_url, game_id, participant_id
                ))
                .bearer_auth(&creator_token)
                .json(&json!([i as i32 + 1]))
                .send()
                .await
                .unwrap();
            assert!(resp.status().is_success(), "set_position failed: {:?}", resp.text().await);
        }

        if round_number < 3 {
            let advance = client
                .post(format!("{}/auth/tournaments/{}/next-round", app.base_url, tournament_id))
                .bearer_auth(&creator_token)
                .send()
                .await
                .unwrap();
            assert!(advance.status().is_success(), "next-round failed: {:?}", advance.text().await);
        }
    }

    let finish_resp = client
        .post(format!("{}/auth/tournaments/{}/finish", app.base_url, tournament_id))
        .bearer_auth(&creator_token)
        .send()
        .await
        .unwrap();
    assert!(finish_resp.status().is_success(), "finish failed: {:?}", finish_resp.text().await);

    let detail_resp = client
        .get(format!("{}/api/tournaments/{}", app.base_url, tournament_id))
        .send()
        .await
        .unwrap();
    let detail: Value = detail_resp.json().await.unwrap();
    let participants = detail["participants"].as_array().unwrap();
    assert_eq!(participants.len(), 8);

    let mut positions: Vec<i64> = participants
        .iter()
        .map(|p| p["final_position"].as_i64().expect("final_position must be set"))
        .collect();
    positions.sort_unstable();
    assert_eq!(positions, (1..=8).collect::<Vec<_>>());

    app.stop().await;
}

/// Boundary behaviors from §8: capacity 7 rejected, capacity 8 accepted.
#[tokio::test]
async fn capacity_boundary() {
    let app = crate::common::spawn_app_with_container().await;
    let client = Client::new();
    let factory = app.factory();

    let creator_id = factory.create_user("creator", "user", None).await.unwrap();
    let token = app.generate_jwt_for_user(creator_id, "creator", Role::User).unwrap();

    let rejected = client
        .post(format!("{}/auth/tournaments", app.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Too Small", "capacity": 7, "totalRounds": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), reqwest::StatusCode::BAD_REQUEST);

    let accepted = client
        .post(format!("{}/auth/tournaments", app.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Just Right", "capacity": 8, "totalRounds": 1 }))
        .send()
        .await
        .unwrap();
    assert!(accepted.status().is_success());

    app.stop().await;
}

/// `join` then `leave` while in registration leaves capacity occupancy
/// unchanged (§8 round-trip property).
#[tokio::test]
async fn join_then_leave_is_idempotent_on_capacity() {
    let app = crate::common::spawn_app_with_container().await;
    let client = Client::new();
    let factory = app.factory();

    let creator_id = factory.create_user("creator", "user", None).await.unwrap();
    let creator_token = app.generate_jwt_for_user(creator_id, "creator", Role::User).unwrap();

    let create_resp = client
        .post(format!("{}/auth/tournaments", app.base_url))
        .bearer_auth(&creator_token)
        .json(&json!({ "name": "Join Leave", "capacity": 8, "totalRounds": 1 }))
        .send()
        .await
        .unwrap();
    let tournament: Value = create_resp.json().await.unwrap();
    let tournament_id = tournament["id"].as_str().unwrap().to_string();

    let user_id: Uuid = factory.create_user("player", "user", None).await.unwrap();
    let token = app.generate_jwt_for_user(user_id, "player", Role::User).unwrap();

    let join = client
        .post(format!("{}/auth/tournaments/{}/join", app.base_url, tournament_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert!(join.status().is_success());

    let leave = client
        .post(format!("{}/auth/tournaments/{}/leave", app.base_url, tournament_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert!(leave.status().is_success());

    let detail: Value = client
        .get(format!("{}/api/tournaments/{}", app.base_url, tournament_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["participants"].as_array().unwrap().len(), 0);

    app.stop().await;
}
