//! Unified error type for the server crate.

use parlor_game::GameError;
use parlor_protocol::ProtocolError;
use parlor_room::RoomError;
use parlor_transport::TransportError;

/// Top-level error wrapping each layer's error type. The `#[from]`
/// variants let `?` convert layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Binding or serving the listener failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A transport-level error (send, receive, close).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room or registry error (not found, full, duplicate).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// A game session error (not active, wrong turn, illegal move).
    #[error(transparent)]
    Game(#[from] GameError),
}
