//! Error types for the game layer.

/// Errors returned by a session state machine's mutation entry points.
///
/// All of these are surfaced to the originating connection as an error
/// envelope and never mutate state. Messages are client-facing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// The game has not started or has already ended.
    #[error("game is not active")]
    NotActive,

    /// The targeted cell already holds a mark.
    #[error("cell is already occupied")]
    OccupiedCell,

    /// The acting role does not match whose turn it is.
    #[error("not your turn")]
    WrongTurn,

    /// The targeted position is outside the board.
    #[error("row and col must be within the board")]
    OutOfBounds,

    /// The rules engine rejected the fully-qualified move.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// The move promotes but no promotion piece was supplied.
    #[error("promotion required but not provided")]
    PromotionRequired,

    /// The engine's mutation queue is gone. Only reachable if the engine
    /// task died, which should not happen while a room holds the handle.
    #[error("game engine unavailable")]
    Unavailable,
}
