//! Error types for the room layer.

/// Errors that can occur during registry and membership operations.
///
/// All of these are surfaced to the requesting client (HTTP response or
/// error envelope) and leave registry state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No room with this code exists.
    #[error("room {0} not found")]
    NotFound(String),

    /// Both seats are taken.
    #[error("room {0} is full")]
    Full(String),

    /// The player is already a member of this room.
    #[error("player {0} already in room {1}")]
    AlreadyJoined(String, String),

    /// A room with the caller-chosen code already exists. Effectively
    /// unreachable for randomly generated codes, but always checked.
    #[error("room {0} already exists")]
    AlreadyExists(String),

    /// The player ID is already registered.
    #[error("player {0} already exists, choose another name")]
    PlayerExists(String),

    /// No such player (in the global registry or in the room asked).
    #[error("player {0} not found")]
    PlayerNotFound(String),

    /// The operation does not apply to the room's current configuration,
    /// e.g. requesting an AI opponent for a game kind without one.
    #[error("invalid room state: {0}")]
    InvalidState(String),
}
