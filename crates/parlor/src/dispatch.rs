//! Inbound action dispatch: wire envelopes → game session mutations.
//!
//! Recognized actions route to the matching session state machine; every
//! failure becomes an error envelope to the originating connection only.
//! Anything unrecognized is stamped and rebroadcast verbatim to the room
//! (chat and other client-to-client traffic).

use std::sync::Arc;

use chrono::Utc;
use parlor_game::{GameError, GameKind, GameSession};
use parlor_protocol::{
    ChessMoveApplied, ChessMovePayload, Codec, Envelope, ErrorEnvelope,
    JsonCodec, TurnMovePayload, actions,
};
use parlor_room::{Player, Room, fanout};

use crate::SharedState;

/// Routes one decoded envelope from `origin`.
pub(crate) async fn handle_action(
    state: &SharedState,
    room: &Arc<Room>,
    origin: &Arc<Player>,
    envelope: Envelope,
) {
    match envelope.action.as_str() {
        actions::TICTACTOE_MOVE => {
            handle_turn_move(state, origin, envelope).await;
        }
        actions::CHESS_MOVE => {
            handle_chess_move(room, origin, envelope).await;
        }
        actions::CREATE_ROOM_WITH_AI => {
            handle_create_ai_room(state, origin, envelope).await;
        }
        _ => {
            // Generic passthrough: rebroadcast to the room untouched.
            fanout::notify(room, envelope).await;
        }
    }
}

/// A tic-tac-toe move. The payload names its own room and player — the
/// room the sender is bound to is not assumed.
async fn handle_turn_move(
    state: &SharedState,
    origin: &Arc<Player>,
    envelope: Envelope,
) {
    let payload: TurnMovePayload = match envelope.payload() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, "bad tic-tac-toe payload");
            send_error(origin, "Invalid message format").await;
            return;
        }
    };

    let room = match state.rooms.get_room(&payload.room_id).await {
        Ok(room) => room,
        Err(e) => {
            send_error(origin, e.to_string()).await;
            return;
        }
    };
    let player = match room.member(&payload.player_id).await {
        Ok(player) => player,
        Err(e) => {
            send_error(origin, e.to_string()).await;
            return;
        }
    };
    player.touch().await;

    let GameSession::TicTacToe(game) = room.session() else {
        send_error(origin, "room is not running tic-tac-toe").await;
        return;
    };
    let Some(role) = player.role().await else {
        send_error(origin, GameError::WrongTurn.to_string()).await;
        return;
    };

    if let Err(e) = game.apply_move(role, payload.row, payload.col).await {
        send_error(origin, e.to_string()).await;
        return;
    }
    broadcast_game_state(&room).await;

    // A successful move that left the game inactive is terminal: give
    // clients the final board for a moment, then reset for a rematch.
    if !game.is_active().await {
        schedule_reset(Arc::clone(state), room);
        return;
    }

    if room.is_ai_enabled().await {
        game.ai_move().await;
        broadcast_game_state(&room).await;
        if !game.is_active().await {
            schedule_reset(Arc::clone(state), room);
        }
    }
}

/// A chess move, played in the room the sender is bound to.
async fn handle_chess_move(
    room: &Arc<Room>,
    origin: &Arc<Player>,
    envelope: Envelope,
) {
    let payload: ChessMovePayload = match envelope.payload() {
        Ok(payload) => payload,
        Err(e) => {
            tracing::debug!(error = %e, "bad chess payload");
            send_error(origin, "Invalid message format").await;
            return;
        }
    };

    let player = match room.member(origin.id()).await {
        Ok(player) => player,
        Err(e) => {
            send_error(origin, e.to_string()).await;
            return;
        }
    };
    player.touch().await;

    let GameSession::Chess(game) = room.session() else {
        send_error(origin, "room is not running chess").await;
        return;
    };
    let Some(role) = player.role().await else {
        send_error(origin, GameError::WrongTurn.to_string()).await;
        return;
    };

    let outcome = match game
        .apply_move(
            role,
            &payload.from,
            &payload.to,
            payload.promotion.as_deref(),
        )
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            send_error(origin, e.to_string()).await;
            return;
        }
    };

    let applied = ChessMoveApplied {
        fen: outcome.fen,
        last_move: payload,
        result: outcome.status.as_str().to_string(),
    };
    match Envelope::from_sender(
        actions::CHESS_MOVE,
        applied,
        player.summary().await,
    ) {
        Ok(envelope) => fanout::notify(room, envelope).await,
        Err(e) => {
            tracing::error!(error = %e, "failed to build move event");
        }
    }
}

/// Creates a room with an AI opponent under the client-chosen code. The
/// new room has no connected members yet, so the created event goes back
/// to the requesting connection rather than through the fanout.
async fn handle_create_ai_room(
    state: &SharedState,
    origin: &Arc<Player>,
    envelope: Envelope,
) {
    let Some(code) = envelope.message.as_str() else {
        send_error(origin, "Invalid message format").await;
        return;
    };

    let room = match state
        .rooms
        .create_room_with_ai(code, GameKind::TicTacToe)
        .await
    {
        Ok(room) => room,
        Err(e) => {
            send_error(origin, e.to_string()).await;
            return;
        }
    };

    match Envelope::new(actions::ROOM_CREATED, room.summary().await) {
        Ok(mut envelope) => {
            envelope.timestamp = Some(Utc::now());
            send_envelope(origin, &envelope).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to build room-created event");
        }
    }
}

/// Broadcasts the authoritative state snapshot for the room's game kind.
pub(crate) async fn broadcast_game_state(room: &Arc<Room>) {
    let envelope = match room.session() {
        GameSession::TicTacToe(game) => {
            Envelope::new(actions::TICTACTOE_GAME_STATE, game.snapshot().await)
        }
        GameSession::Chess(game) => {
            Envelope::new(actions::CHESS_GAME_STATE, game.fen().await)
        }
    };
    match envelope {
        Ok(envelope) => fanout::notify(room, envelope).await,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode game state");
        }
    }
}

/// The deferred rematch reset. Fires after the display delay and checks
/// that state has not moved on: the room must still hold both players
/// and the board must still show a finished game, otherwise it no-ops.
fn schedule_reset(state: SharedState, room: Arc<Room>) {
    tokio::spawn(async move {
        tokio::time::sleep(state.config.reset_delay).await;
        let GameSession::TicTacToe(game) = room.session() else {
            return;
        };
        if !room.is_active().await {
            return; // membership dropped; the room is waiting for players
        }
        if game.snapshot().await.winner.is_empty() {
            return; // already reset
        }
        game.reset(true).await;
        tracing::debug!(room = %room.code(), "board reset for rematch");
        broadcast_game_state(&room).await;
    });
}

/// Error envelope to the originating connection only. Never broadcast.
pub(crate) async fn send_error(player: &Player, message: impl Into<String>) {
    let envelope = ErrorEnvelope::new(message);
    match JsonCodec.encode(&envelope) {
        Ok(bytes) => {
            let _ = player.try_enqueue(bytes).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to encode error envelope");
        }
    }
}

async fn send_envelope(player: &Player, envelope: &Envelope) {
    match JsonCodec.encode(envelope) {
        Ok(bytes) => {
            let _ = player.try_enqueue(bytes).await;
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to encode envelope");
        }
    }
}
