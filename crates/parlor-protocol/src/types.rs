//! Wire message types.
//!
//! Every message on the wire is an [`Envelope`]: an action string, an
//! action-specific payload, an optional sender summary, and a server-side
//! timestamp stamped at broadcast time. Error replies use the separate
//! [`ErrorEnvelope`] shape and go to the originating connection only.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ProtocolError;

/// A player as it appears inside wire messages: identity plus the role
/// token they hold in their room (`"X"`, `"O"`, `"white"`, `"black"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub player_id: String,
    #[serde(default)]
    pub player_mark: String,
}

/// The top-level wire envelope.
///
/// The `message` field is kept as raw JSON here; the action string decides
/// which payload type it decodes to. Unrecognized actions are relayed with
/// the payload untouched, so this layer must not force a schema on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub action: String,
    #[serde(default)]
    pub message: Value,
    #[serde(default)]
    pub sender: Option<PlayerSummary>,
    /// Stamped by the broadcast fanout; `None` until then.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Envelope {
    /// Builds an envelope with no sender, serializing the payload.
    pub fn new(
        action: &str,
        message: impl Serialize,
    ) -> Result<Self, ProtocolError> {
        Ok(Self {
            action: action.to_string(),
            message: serde_json::to_value(message)
                .map_err(ProtocolError::Encode)?,
            sender: None,
            timestamp: None,
        })
    }

    /// Builds an envelope attributed to a sender.
    pub fn from_sender(
        action: &str,
        message: impl Serialize,
        sender: PlayerSummary,
    ) -> Result<Self, ProtocolError> {
        let mut envelope = Self::new(action, message)?;
        envelope.sender = Some(sender);
        Ok(envelope)
    }

    /// Decodes the payload as the type the action implies.
    pub fn payload<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, ProtocolError> {
        serde_json::from_value(self.message.clone())
            .map_err(ProtocolError::Decode)
    }
}

/// Error reply sent to a single connection. Never broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: "error".to_string(),
            message: message.into(),
        }
    }
}

/// Payload of [`actions::TICTACTOE_MOVE`](crate::actions::TICTACTOE_MOVE).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMovePayload {
    pub room_id: String,
    pub player_id: String,
    pub row: usize,
    pub col: usize,
}

/// Payload of [`actions::CHESS_MOVE`](crate::actions::CHESS_MOVE) when sent
/// by a client. Squares are algebraic (`"e2"`, `"e8"`); `promotion` is the
/// lowercase piece letter (`"q"`, `"r"`, `"b"`, `"n"`) when the move
/// promotes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessMovePayload {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
}

/// Payload of the outbound move-applied event for chess: the authoritative
/// position after the move, the move that produced it, and the game status
/// (`"ongoing"`, `"checkmate"`, `"stalemate"`, `"draw"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChessMoveApplied {
    pub fen: String,
    #[serde(rename = "lastMove")]
    pub last_move: ChessMovePayload,
    pub result: String,
}

/// Payload of [`actions::TICTACTOE_GAME_STATE`](crate::actions::TICTACTOE_GAME_STATE).
///
/// Cells hold `""`, `"X"`, or `"O"`; `winner` is `""` while the game is
/// undecided, a mark on a win, or `"Draw"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnStateSnapshot {
    pub board: [[String; 3]; 3],
    pub turn: String,
    pub winner: String,
    pub is_active: bool,
}

/// Payload of [`actions::MARK_UPDATE`](crate::actions::MARK_UPDATE):
/// player-ID → role token for every current member, plus whether the room
/// is still active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkUpdate {
    pub marks: HashMap<String, String>,
    pub active: bool,
}

/// A room as reported to clients (join responses, room-created events).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    pub room_id: String,
    pub players: HashMap<String, PlayerSummary>,
    pub game_type: String,
    pub is_active: bool,
    pub is_ai_enabled: bool,
}

#[cfg(test)]
mod tests {
    //! The wire shapes are consumed by browser clients; these tests pin the
    //! exact JSON field names and defaults so a serde attribute change
    //! cannot silently break the contract.

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_envelope_serializes_expected_fields() {
        let envelope = Envelope::new("PING", "hello").unwrap();
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["action"], "PING");
        assert_eq!(json["message"], "hello");
        assert!(json["sender"].is_null());
        assert!(json["timestamp"].is_null());
    }

    #[test]
    fn test_envelope_deserializes_without_optional_fields() {
        let json = r#"{"action": "CHAT", "message": {"text": "hi"}}"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();

        assert_eq!(envelope.action, "CHAT");
        assert_eq!(envelope.message["text"], "hi");
        assert_eq!(envelope.sender, None);
        assert_eq!(envelope.timestamp, None);
    }

    #[test]
    fn test_envelope_from_sender_attributes_message() {
        let sender = PlayerSummary {
            player_id: "alice".into(),
            player_mark: "X".into(),
        };
        let envelope =
            Envelope::from_sender("CHAT", "hello", sender).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["sender"]["player_id"], "alice");
        assert_eq!(json["sender"]["player_mark"], "X");
    }

    #[test]
    fn test_envelope_payload_decodes_turn_move() {
        let json = r#"{
            "action": "TICTACTOE_MOVE",
            "message": {"room_id": "R1", "player_id": "alice", "row": 0, "col": 2}
        }"#;
        let envelope: Envelope = serde_json::from_str(json).unwrap();
        let payload: TurnMovePayload = envelope.payload().unwrap();

        assert_eq!(payload.room_id, "R1");
        assert_eq!(payload.player_id, "alice");
        assert_eq!(payload.row, 0);
        assert_eq!(payload.col, 2);
    }

    #[test]
    fn test_envelope_payload_wrong_shape_is_decode_error() {
        let envelope = Envelope::new("TICTACTOE_MOVE", "not a move").unwrap();
        let result: Result<TurnMovePayload, _> = envelope.payload();
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_error_envelope_json_shape() {
        let err = ErrorEnvelope::new("room not found");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "room not found");
    }

    #[test]
    fn test_chess_move_payload_promotion_optional() {
        let payload: ChessMovePayload =
            serde_json::from_str(r#"{"from": "e2", "to": "e4"}"#).unwrap();
        assert_eq!(payload.promotion, None);

        // Absent promotion is omitted on the way back out.
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("promotion").is_none());

        let payload: ChessMovePayload = serde_json::from_str(
            r#"{"from": "e7", "to": "e8", "promotion": "q"}"#,
        )
        .unwrap();
        assert_eq!(payload.promotion.as_deref(), Some("q"));
    }

    #[test]
    fn test_chess_move_applied_uses_last_move_key() {
        let applied = ChessMoveApplied {
            fen: "8/8/8/8/8/8/8/8 w - - 0 1".into(),
            last_move: ChessMovePayload {
                from: "e2".into(),
                to: "e4".into(),
                promotion: None,
            },
            result: "ongoing".into(),
        };
        let json = serde_json::to_value(&applied).unwrap();

        assert_eq!(json["lastMove"]["from"], "e2");
        assert_eq!(json["result"], "ongoing");
    }

    #[test]
    fn test_turn_state_snapshot_round_trip() {
        let snapshot = TurnStateSnapshot {
            board: [
                ["X".into(), "".into(), "".into()],
                ["".into(), "O".into(), "".into()],
                ["".into(), "".into(), "".into()],
            ],
            turn: "X".into(),
            winner: "".into(),
            is_active: true,
        };
        let bytes = serde_json::to_vec(&snapshot).unwrap();
        let decoded: TurnStateSnapshot =
            serde_json::from_slice(&bytes).unwrap();
        assert_eq!(snapshot, decoded);
    }

    #[test]
    fn test_mark_update_round_trip() {
        let mut marks = HashMap::new();
        marks.insert("alice".to_string(), "X".to_string());
        let update = MarkUpdate {
            marks,
            active: false,
        };
        let bytes = serde_json::to_vec(&update).unwrap();
        let decoded: MarkUpdate = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(update, decoded);
    }

    #[test]
    fn test_decode_garbage_returns_error() {
        let garbage = b"not json at all";
        let result: Result<Envelope, _> = serde_json::from_slice(garbage);
        assert!(result.is_err());
    }

    #[test]
    fn test_decode_missing_action_returns_error() {
        let wrong = r#"{"message": "hello"}"#;
        let result: Result<Envelope, _> = serde_json::from_str(wrong);
        assert!(result.is_err());
    }
}
