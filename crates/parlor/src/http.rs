//! The thin HTTP surface: player registration and room create/join.
//!
//! These endpoints only touch the registries; all game traffic flows over
//! the WebSocket. Responses use a uniform `{success, message, data}`
//! shape.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use parlor_game::GameKind;
use parlor_protocol::RoomSummary;
use parlor_room::RoomError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::SharedState;

/// Uniform response body for every HTTP endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ApiResponse {
    fn ok(message: &str, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data,
        }
    }

    pub(crate) fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn error_status(err: &RoomError) -> StatusCode {
    match err {
        RoomError::NotFound(_) | RoomError::PlayerNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::BAD_REQUEST,
    }
}

fn room_error(err: RoomError) -> ApiResult {
    (error_status(&err), Json(ApiResponse::err(err.to_string())))
}

pub(crate) async fn index() -> ApiResult {
    (
        StatusCode::OK,
        Json(ApiResponse::ok("Hello from Parlor", None)),
    )
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub player_id: String,
}

/// `POST /create/user` — registers a player identity.
pub(crate) async fn register_player(
    State(state): State<SharedState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult {
    if req.player_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("player_id is required")),
        );
    }

    match state.players.add(&req.player_id).await {
        Ok(player) => {
            let summary = player.summary().await;
            (
                StatusCode::CREATED,
                Json(ApiResponse::ok(
                    "Success registering player",
                    serde_json::to_value(summary).ok(),
                )),
            )
        }
        Err(e) => room_error(e),
    }
}

/// Data payload returned by the create and join endpoints.
#[derive(Debug, Serialize)]
struct JoinData {
    player_id: String,
    player_mark: String,
    room: RoomSummary,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub game_type: String,
    #[serde(default)]
    pub player_id: String,
}

/// `POST /room/create` — creates a room with a generated code and joins
/// the creator into its first seat.
pub(crate) async fn create_room(
    State(state): State<SharedState>,
    Json(req): Json<CreateRoomRequest>,
) -> ApiResult {
    if req.game_type.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("game_type is required")),
        );
    }
    let kind: GameKind = match req.game_type.parse() {
        Ok(kind) => kind,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::err(format!("{e}"))),
            );
        }
    };

    let player = match state.players.get(&req.player_id).await {
        Ok(player) => player,
        Err(e) => return room_error(e),
    };
    player.touch().await;

    let room = match state.rooms.create_room(kind).await {
        Ok(room) => room,
        Err(e) => return room_error(e),
    };
    let role = match room.join(player).await {
        Ok(role) => role,
        Err(e) => return room_error(e),
    };

    let data = JoinData {
        player_id: req.player_id,
        player_mark: role.as_str().to_string(),
        room: room.summary().await,
    };
    (
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            "Room created successfully",
            serde_json::to_value(data).ok(),
        )),
    )
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    #[serde(default)]
    pub room_id: String,
    #[serde(default)]
    pub player_id: String,
    #[serde(default)]
    pub game_type: String,
}

/// `POST /room/join` — joins an existing room, validating that the
/// room actually runs the game the client expects.
pub(crate) async fn join_room(
    State(state): State<SharedState>,
    Json(req): Json<JoinRoomRequest>,
) -> ApiResult {
    let player = match state.players.get(&req.player_id).await {
        Ok(player) => player,
        Err(e) => return room_error(e),
    };
    player.touch().await;

    let room = match state.rooms.get_room(&req.room_id).await {
        Ok(room) => room,
        Err(e) => return room_error(e),
    };

    if room.kind().as_str() != req.game_type {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("game type does not match the room")),
        );
    }

    let role = match room.join(player).await {
        Ok(role) => role,
        Err(e) => return room_error(e),
    };

    let data = JoinData {
        player_id: req.player_id,
        player_mark: role.as_str().to_string(),
        room: room.summary().await,
    };
    (
        StatusCode::OK,
        Json(ApiResponse::ok(
            "Player joined room successfully",
            serde_json::to_value(data).ok(),
        )),
    )
}
