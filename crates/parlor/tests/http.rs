//! HTTP surface tests, driven through the router in-process.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use parlor::{AppState, ServerConfig, router};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::new(ServerConfig::default()))
}

async fn post(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_index_responds() {
    let app = app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_player_created() {
    let app = app();
    let (status, body) =
        post(&app, "/create/user", json!({"player_id": "alice"})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["player_id"], "alice");
}

#[tokio::test]
async fn test_register_duplicate_rejected() {
    let app = app();
    post(&app, "/create/user", json!({"player_id": "alice"})).await;
    let (status, body) =
        post(&app, "/create/user", json!({"player_id": "alice"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(
        body["message"]
            .as_str()
            .unwrap()
            .contains("already exists")
    );
}

#[tokio::test]
async fn test_register_empty_id_rejected() {
    let app = app();
    let (status, _) = post(&app, "/create/user", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_room_joins_creator_as_first_mover() {
    let app = app();
    post(&app, "/create/user", json!({"player_id": "alice"})).await;

    let (status, body) = post(
        &app,
        "/room/create",
        json!({"game_type": "tictactoe", "player_id": "alice"}),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["player_mark"], "X");
    assert_eq!(body["data"]["room"]["game_type"], "tictactoe");
    assert_eq!(body["data"]["room"]["is_active"], false);
    assert_eq!(body["data"]["room"]["room_id"].as_str().unwrap().len(), 7);
}

#[tokio::test]
async fn test_create_room_unknown_game_type_rejected() {
    let app = app();
    post(&app, "/create/user", json!({"player_id": "alice"})).await;

    let (status, body) = post(
        &app,
        "/room/create",
        json!({"game_type": "checkers", "player_id": "alice"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(
        body["message"].as_str().unwrap().contains("unknown game type")
    );
}

#[tokio::test]
async fn test_create_room_unregistered_player_not_found() {
    let app = app();
    let (status, _) = post(
        &app,
        "/room/create",
        json!({"game_type": "chess", "player_id": "ghost"}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_room_second_player_activates() {
    let app = app();
    post(&app, "/create/user", json!({"player_id": "alice"})).await;
    post(&app, "/create/user", json!({"player_id": "bob"})).await;
    let (_, created) = post(
        &app,
        "/room/create",
        json!({"game_type": "chess", "player_id": "alice"}),
    )
    .await;
    let room_id = created["data"]["room"]["room_id"].as_str().unwrap();

    let (status, body) = post(
        &app,
        "/room/join",
        json!({
            "room_id": room_id,
            "player_id": "bob",
            "game_type": "chess"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["player_mark"], "black");
    assert_eq!(body["data"]["room"]["is_active"], true);
}

#[tokio::test]
async fn test_join_room_game_type_mismatch_rejected() {
    let app = app();
    post(&app, "/create/user", json!({"player_id": "alice"})).await;
    post(&app, "/create/user", json!({"player_id": "bob"})).await;
    let (_, created) = post(
        &app,
        "/room/create",
        json!({"game_type": "tictactoe", "player_id": "alice"}),
    )
    .await;
    let room_id = created["data"]["room"]["room_id"].as_str().unwrap();

    let (status, body) = post(
        &app,
        "/room/join",
        json!({
            "room_id": room_id,
            "player_id": "bob",
            "game_type": "chess"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("does not match"));
}

#[tokio::test]
async fn test_join_unknown_room_not_found() {
    let app = app();
    post(&app, "/create/user", json!({"player_id": "bob"})).await;

    let (status, _) = post(
        &app,
        "/room/join",
        json!({
            "room_id": "NOSUCH1",
            "player_id": "bob",
            "game_type": "chess"
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_join_full_room_rejected() {
    let app = app();
    for id in ["alice", "bob", "carol"] {
        post(&app, "/create/user", json!({"player_id": id})).await;
    }
    let (_, created) = post(
        &app,
        "/room/create",
        json!({"game_type": "tictactoe", "player_id": "alice"}),
    )
    .await;
    let room_id = created["data"]["room"]["room_id"]
        .as_str()
        .unwrap()
        .to_string();

    post(
        &app,
        "/room/join",
        json!({
            "room_id": room_id,
            "player_id": "bob",
            "game_type": "tictactoe"
        }),
    )
    .await;
    let (status, body) = post(
        &app,
        "/room/join",
        json!({
            "room_id": room_id,
            "player_id": "carol",
            "game_type": "tictactoe"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("full"));
}
