//! Per-connection lifecycle: binding, the three loops, and eviction.
//!
//! Each accepted WebSocket gets one handler task. The upgrade request's
//! query parameters name the room and player; both are validated before
//! the upgrade completes. After binding, three loops run per connection:
//!
//! - the **read loop** (this task) — decodes envelopes and dispatches
//!   them; any transport error or idle deadline ends it;
//! - the **write pump** — drains the player's bounded outbound queue to
//!   the socket in enqueue order;
//! - the **heartbeat loop** — periodic liveness pings; stops when a ping
//!   fails or the read loop completes.
//!
//! When the read loop ends, the player is *not* removed from the room:
//! their status flips to disconnected, the room hears a presence event,
//! and an eviction timer starts. Reconnecting within the grace period
//! rebinds the transport and the timer fires as a no-op.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::ws::WebSocket;
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parlor_game::GameKind;
use parlor_protocol::{Codec, Envelope, JsonCodec, actions};
use parlor_room::{
    ConnectionStatus, MAX_PLAYERS, Player, Room, fanout,
};
use parlor_transport::{Incoming, WsReceiver, WsSender};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::SharedState;
use crate::dispatch;
use crate::http::ApiResponse;

#[derive(Debug, Deserialize)]
pub(crate) struct WsQuery {
    #[serde(default)]
    room_id: String,
    #[serde(default)]
    player_id: String,
}

/// `GET /ws?room_id=&player_id=` — validates the binding target, then
/// upgrades and hands the socket to [`handle_connection`].
pub(crate) async fn ws_handler(
    State(state): State<SharedState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    if query.room_id.is_empty() || query.player_id.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::err("room_id and player_id are required")),
        )
            .into_response();
    }

    let room = match state.rooms.get_room(&query.room_id).await {
        Ok(room) => room,
        Err(e) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::err(e.to_string())),
            )
                .into_response();
        }
    };
    let player = match room.member(&query.player_id).await {
        Ok(player) => player,
        Err(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::err("player not found in room")),
            )
                .into_response();
        }
    };

    ws.on_upgrade(move |socket| {
        handle_connection(state, room, player, socket)
    })
}

/// Runs one connection from bind to disconnect.
async fn handle_connection(
    state: SharedState,
    room: Arc<Room>,
    player: Arc<Player>,
    socket: WebSocket,
) {
    let (tx, mut rx) = parlor_transport::split(socket);
    let (queue_tx, queue_rx) = mpsc::channel(state.config.queue_capacity);
    player.bind(queue_tx.clone()).await;
    state.players.touch(player.id()).await;

    let write_pump = tokio::spawn(run_write_pump(tx.clone(), queue_rx));
    let heartbeat = tokio::spawn(run_heartbeat(
        tx.clone(),
        state.config.heartbeat_interval,
    ));

    tracing::info!(
        room = %room.code(),
        player = %player.id(),
        "player connected"
    );
    notify_on_connection(&room, &player).await;

    run_read_loop(&state, &room, &player, &mut rx).await;

    // Read loop done. Tear down the sibling loops, then run the
    // disconnect path — unless a reconnection already superseded this
    // handler, in which case the player is not ours to disconnect.
    heartbeat.abort();
    if player.unbind(&queue_tx).await {
        tracing::info!(
            room = %room.code(),
            player = %player.id(),
            "player disconnected, grace period started"
        );
        let summary = player.summary().await;
        match Envelope::from_sender(
            actions::USER_LEFT_ROOM,
            format!("Player {} left the room", player.id()),
            summary,
        ) {
            Ok(envelope) => fanout::notify(&room, envelope).await,
            Err(e) => {
                tracing::error!(error = %e, "failed to build presence event");
            }
        }
        schedule_eviction(Arc::clone(&state), room, player);
    }

    // Our queue sender clone is the last one; dropping it closes the
    // queue and lets the write pump drain out and close the socket.
    drop(queue_tx);
    let _ = write_pump.await;
}

/// Presence event plus a full state snapshot for the connecting player's
/// room; chess rooms that are already active additionally hear that the
/// game can start.
async fn notify_on_connection(room: &Arc<Room>, player: &Arc<Player>) {
    let summary = player.summary().await;
    match Envelope::from_sender(
        actions::CONNECTED_ON_SERVER,
        format!(
            "Player {} connected to room {}",
            player.id(),
            room.code()
        ),
        summary.clone(),
    ) {
        Ok(envelope) => fanout::notify(room, envelope).await,
        Err(e) => {
            tracing::error!(error = %e, "failed to build presence event");
        }
    }

    dispatch::broadcast_game_state(room).await;

    if room.kind() == GameKind::Chess && room.is_active().await {
        match Envelope::from_sender(
            actions::START_GAME,
            "both players connected, game starting",
            summary,
        ) {
            Ok(envelope) => fanout::notify(room, envelope).await,
            Err(e) => {
                tracing::error!(error = %e, "failed to build start event");
            }
        }
    }
}

/// Blocks on the transport for the next frame, decodes, and dispatches.
/// Decode failures are reported to the origin and the loop continues;
/// transport errors and the idle deadline end it.
async fn run_read_loop(
    state: &SharedState,
    room: &Arc<Room>,
    player: &Arc<Player>,
    rx: &mut WsReceiver,
) {
    loop {
        let frame =
            tokio::time::timeout(state.config.read_deadline, rx.recv())
                .await;
        let data = match frame {
            Ok(Ok(Some(Incoming::Message(data)))) => data,
            // Keepalives carry no payload but re-arm the deadline.
            Ok(Ok(Some(Incoming::Keepalive))) => continue,
            Ok(Ok(None)) => {
                tracing::info!(
                    player = %player.id(),
                    "connection closed cleanly"
                );
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(
                    player = %player.id(),
                    error = %e,
                    "recv error"
                );
                break;
            }
            Err(_) => {
                tracing::info!(
                    player = %player.id(),
                    "read deadline elapsed"
                );
                break;
            }
        };

        let envelope: Envelope = match JsonCodec.decode(&data) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(
                    player = %player.id(),
                    error = %e,
                    "failed to decode envelope"
                );
                dispatch::send_error(player, "Invalid message format").await;
                continue;
            }
        };

        state.players.touch(player.id()).await;
        dispatch::handle_action(state, room, player, envelope).await;
    }
}

/// Drains the outbound queue to the socket in enqueue order. A fatal
/// write error exits without retry — the surrounding disconnect path is
/// the only recovery.
async fn run_write_pump(tx: WsSender, mut queue: mpsc::Receiver<Vec<u8>>) {
    while let Some(bytes) = queue.recv().await {
        if let Err(e) = tx.send(&bytes).await {
            tracing::debug!(error = %e, "write failed, stopping pump");
            return;
        }
    }
    // Queue closed: tell the peer instead of letting them time out.
    let _ = tx.close().await;
}

/// Periodic liveness probe. Exits on the first failed ping; the handler
/// aborts it when the read loop completes.
async fn run_heartbeat(tx: WsSender, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.tick().await; // the first tick is immediate; skip it
    loop {
        ticker.tick().await;
        if tx.ping().await.is_err() {
            tracing::debug!("ping failed, stopping heartbeat");
            return;
        }
    }
}

/// Starts the grace-period timer for a disconnected player.
fn schedule_eviction(
    state: SharedState,
    room: Arc<Room>,
    player: Arc<Player>,
) {
    tokio::spawn(async move {
        tokio::time::sleep(state.config.grace_period).await;
        evict_if_still_disconnected(&state, &room, &player).await;
    });
}

/// The timer callback. Idempotent: it checks the player's current status
/// before acting, so a reconnection (or an earlier timer) makes it a
/// no-op.
async fn evict_if_still_disconnected(
    state: &SharedState,
    room: &Arc<Room>,
    player: &Arc<Player>,
) {
    match player.status().await {
        ConnectionStatus::Connected => return, // reconnected in time
        ConnectionStatus::Evicted => return,   // another timer won
        ConnectionStatus::Disconnected { .. } => {}
    }

    player.mark_evicted().await;
    let remaining = room.remove_member(player.id()).await;
    tracing::info!(
        room = %room.code(),
        player = %player.id(),
        remaining,
        "player evicted after grace period"
    );

    if remaining == 0 {
        state.rooms.remove_room(room.code()).await;
        return;
    }

    if remaining < MAX_PLAYERS {
        let update = room.demote_to_waiting().await;
        match Envelope::new(actions::MARK_UPDATE, update) {
            Ok(envelope) => fanout::notify(room, envelope).await,
            Err(e) => {
                tracing::error!(error = %e, "failed to build mark update");
            }
        }
        dispatch::broadcast_game_state(room).await;
    }
}
