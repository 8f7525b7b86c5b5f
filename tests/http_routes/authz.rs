use reqwest::Client;
use serde_json::{Value, json};
use tourney_engine_be::models::Role;

/// §8 scenario 5: a non-participant, non-admin, non-creator user gets `403`
/// submitting a placement; the game's lobby maker succeeds on the same payload.
#[tokio::test]
async fn non_participant_is_forbidden_lobby_maker_is_allowed() {
    let app = crate::common::spawn_app_with_container().await;
    let client = Client::new();
    let factory = app.factory();

    let creator_id = factory.create_user("creator", "user", None).await.unwrap();
    let creator_token = app.generate_jwt_for_user(creator_id, "creator", Role::User).unwrap();

    let create_resp = client
        .post(format!("{}/auth/tournaments", app.base_url))
        .bearer_auth(&creator_token)
        .json(&json!({ "name": "Authz", "capacity": 8, "totalRounds": 1 }))
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
    let first_participant_id = game["slots"][0]["participant_id"].as_str().unwrap();
    let lobby_maker_user_id = game["lobby_maker_user_id"].as_str().unwrap().to_string();

    let outsider_id = factory.create_user("outsider", "user", None).await.unwrap();
    let outsider_token = app.generate_jwt_for_user(outsider_id, "outsider", Role::User).unwrap();

    let denied = client
        .put(format!(
            "{}/auth/games/{}/participants/{}/position",
            app.base_url, game_id, first_participant_id
        ))
        .bearer_auth(&outsider_token)
        .json(&json!([1]))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status(), reqwest::StatusCode::FORBIDDEN);

    // The lobby maker is one of the seated players; find their token by
    // matching the auto-selected `lobby_maker_user_id` against the pool.
    let lobby_maker_token = app
        .generate_jwt_for_user(
            lobby_maker_user_id.parse().unwrap(),
            "lobby-maker",
            Role::User,
        )
        .unwrap();

    let allowed = client
        .put(format!(
            "{}/auth/games/{}/participants/{}/position",
            app.base_url, game_id, first_participant_id
        ))
        .bearer_auth(&lobby_maker_token)
        .json(&json!([1]))
        .send()
        .await
        .unwrap();
    assert!(allowed.status().is_success(), "lobby maker submission failed: {:?}", allowed.text().await);

    app.stop().await;
}
