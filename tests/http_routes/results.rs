use reqwest::Client;
use serde_json::{Value, json};
use tourney_engine_be::models::Role;

/// Sets up an 8-player capacity-8 tournament, started, with its single round-1
/// game's slots and the creator's bearer token, returning `(tournament_id,
/// game_id, [(participant_id, token); 8], creator_token)`.
async fn start_single_game_tournament(
    app: &crate::common::TestApp,
    client: &Client,
) -> (String, String, Vec<(String, String)>, String) {
    let factory = app.factory();
    let creator_id = factory.create_user("creator", "user", None).await.unwrap();
    let creator_token = app.generate_jwt_for_user(creator_id, "creator", Role::User).unwrap();

    let create_resp = client
        .post(format!("{}/auth/tournaments", app.base_url))
        .bearer_auth(&creator_token)
        .json(&json!({ "name": "Results", "capacity": 8, "totalRounds": 1 }))
        .send()
        .await
        .unwrap();
    let tournament: Value = create_resp.json().await.unwrap();
    let tournament_id = tournament["id"].as_str().unwrap().to_string();

    let mut seats = Vec::new();
    for i in 0..8 {
        let user_id = factory.create_user(&format!("p{i}"), "user", None).await.unwrap();
        let token = app.generate_jwt_for_user(user_id, &format!("p{i}"), Role::User).unwrap();
        client
            .post(format!("{}/auth/tournaments/{}/join", app.base_url, tournament_id))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        seats.push(token);
    }

    client
        .post(format!("{}/auth/tournaments/{}/start", app.base_url, tournament_id))
        .bearer_auth(&creator_token)
        .send()
        .await
        .unwrap();

    let games: Value = client
        .get(format!("{}/api/tournaments/{}/rounds/1/games", app.base_url, tournament_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let game = &games["games"][0];
    let game_id = game["id"].as_str().unwrap().to_string();
    let slots = game["slots"].as_array().unwrap();

    let participant_tokens: Vec<(String, String)> = slots
        .iter()
        .zip(seats.into_iter())
        .map(|(slot, token)| (slot["participant_id"].as_str().unwrap().to_string(), token))
        .collect();

    (tournament_id, game_id, participant_tokens, creator_token)
}

/// Shared placements `[2,3]` used twice over the 8 slots (§8 scenario 4):
/// accepted, and `calculated_points` match the table exactly.
#[tokio::test]
async fn tied_placements_score_per_table() {
    let app = crate::common::spawn_app_with_container().await;
    let client = Client::new();
    let (_tournament_id, game_id, seats, creator_token) =
        start_single_game_tournament(&app, &client).await;

    let placements: [&[i32]; 8] = [
        &[1],
        &[2, 3],
        &[2, 3],
        &[4],
        &[5],
        &[6],
        &[7],
        &[8],
    ];
    let expected = [8.2, 6.6, 6.6, 5.0, 4.0, 3.0, 2.0, 1.0];

    for ((participant_id, _), placement) in seats.iter().zip(placements.iter()) {
        let resp = client
            .put(format!(
                "{}/auth/games/{}/participants/{}/position",
                app.base_url, game_id, participant_id
            ))
            .bearer_auth(&creator_token)
            .json(placement)
            .send()
            .await
            .unwrap();
        assert!(resp.status().is_success(), "set_position failed: {:?}", resp.text().await);
    }

    let games: Value = client
        .get(format!("{}/api/tournaments/{}/rounds/1/games", app.base_url, _tournament_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let slots = games["games"][0]["slots"].as_array().unwrap();
    let mut by_id: std::collections::HashMap<&str, f64> = std::collections::HashMap::new();
    for slot in slots {
        by_id.insert(
            slot["participant_id"].as_str().unwrap(),
            slot["calculated_points"].as_f64().unwrap(),
        );
    }
    for ((participant_id, _), want) in seats.iter().zip(expected.iter()) {
        assert_eq!(by_id[participant_id.as_str()], *want);
    }

    app.stop().await;
}

/// Set positions for all 8 slots, clear one, set it again with the same
/// value: `calculated_points` is identical (§8 idempotence property).
#[tokio::test]
async fn clear_then_resubmit_same_value_is_idempotent() {
    let app = crate::common::spawn_app_with_container().await;
    let client = Client::new();
    let (tournament_id, game_id, seats, creator_token) =
        start_single_game_tournament(&app, &client).await;

    for (i, (participant_id, _)) in seats.iter().enumerate() {
        client
            .put(format!(
                "{}/auth/games/{}/participants/{}/position",
                app.base_url, game_id, participant_id
            ))
            .bearer_auth(&creator_token)
            .json(&json!([i as i32 + 1]))
            .send()
            .await
            .unwrap();
    }

    let (target_participant_id, _) = &seats[0];

    let clear = client
        .delete(format!(
            "{}/auth/games/{}/participants/{}/position",
            app.base_url, game_id, target_participant_id
        ))
        .bearer_auth(&creator_token)
        .send()
        .await
        .unwrap();
    assert!(clear.status().is_success(), "clear failed: {:?}", clear.text().await);

    let resubmit = client
        .put(format!(
            "{}/auth/games/{}/participants/{}/position",
            app.base_url, game_id, target_participant_id
        ))
        .bearer_auth(&creator_token)
        .json(&json!([1]))
        .send()
        .await
        .unwrap();
    assert!(resubmit.status().is_success());

    let games: Value = client
        .get(format!("{}/api/tournaments/{}/rounds/1/games", app.base_url, tournament_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let slots = games["games"][0]["slots"].as_array().unwrap();
    let slot = slots
        .iter()
        .find(|s| s["participant_id"].as_str().unwrap() == target_participant_id)
        .unwrap();
    assert_eq!(slot["calculated_points"].as_f64().unwrap(), 8.2);

    app.stop().await;
}

/// Non-consecutive shared placements `[1,3]` are rejected; `[1,2]` is accepted
/// (§8 boundary behavior).
#[tokio::test]
async fn non_consecutive_shared_placement_rejected() {
    let app = crate::common::spawn_app_with_container().await;
    let client = Client::new();
    let (_tournament_id, game_id, seats, creator_token) =
        start_single_game_tournament(&app, &client).await;
    let (participant_id, _) = &seats[0];

    let rejected = client
        .put(format!(
            "{}/auth/games/{}/participants/{}/position",
            app.base_url, game_id, participant_id
        ))
        .bearer_auth(&creator_token)
        .json(&json!([1, 3]))
        .send()
        .await
        .unwrap();
    assert_eq!(rejected.status(), reqwest::StatusCode::BAD_REQUEST);

    let accepted = client
        .put(format!(
            "{}/auth/games/{}/participants/{}/position",
            app.base_url, game_id, participant_id
        ))
        .bearer_auth(&creator_token)
        .json(&json!([1, 2]))
        .send()
        .await
        .unwrap();
    assert!(accepted.status().is_success());

    app.stop().await;
}
