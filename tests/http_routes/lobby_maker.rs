use reqwest::Client;
use serde_json::{Value, json};
use tourney_engine_be::models::Role;

/// Lobby-maker removal on a game with one submitted result is rejected
/// (§8 boundary behavior).
#[tokio::test]
async fn removal_rejected_once_a_result_is_submitted() {
    let app = crate::common::spawn_app_with_container().await;
    let client = Client::new();
    let factory = app.factory();

    let creator_id = factory.create_user("creator", "user", None).await.unwrap();
    let creator_token = app.generate_jwt_for_user(creator_id, "creator", Role::User).unwrap();

    let create_resp = client
        .post(format!("{}/auth/tournaments", app.base_url))
        .bearer_auth(&creator_token)
        .json(&json!({ "name": "Lobby Maker", "capacity": 8, "totalRounds": 1 }))
        .send()
        .await
        .unwrap();
    let tournament: Value = create_resp.json().await.unwrap();
    let tournament_id = tournament["id"].as_str().unwrap().to_string();

    for i in 0..8 {
        let user_id = factory.create_user(&format!("p{i}"), "user", None).await.unwrap();
        let token = app.generate_jwt_for_user(user_id, &format!("p{i}"), Role::User).unwrap();
        client
            .post(format!("{}/auth/tournaments/{}/join", app.base_url, tournament_id))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
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
    let first_slot = &game["slots"][0];
    let first_participant_id = first_slot["participant_id"].as_str().unwrap();

    // Exactly one game per tournament, so a lobby maker was auto-selected on start.
    let set_result = client
        .put(format!(
            "{}/auth/games/{}/participants/{}/position",
            app.base_url, game_id, first_participant_id
        ))
        .bearer_auth(&creator_token)
        .json(&json!([1]))
        .send()
        .await
        .unwrap();
    assert!(set_result.status().is_success());

    let remove = client
        .delete(format!("{}/auth/games/{}/lobby-maker", app.base_url, game_id))
        .bearer_auth(&creator_token)
        .send()
        .await
        .unwrap();
    assert_eq!(remove.status(), reqwest::StatusCode::BAD_REQUEST);

    app.stop().await;
}
