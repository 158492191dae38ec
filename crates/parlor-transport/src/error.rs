//! Error types for the transport layer.

/// Errors that can occur on a live connection.
///
/// All of these are terminal for the connection's loops: the caller's
/// only recovery is the surrounding disconnect path. None are retried.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer closed the connection.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Writing a message or ping to the socket failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] axum::Error),

    /// Reading the next message from the socket failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] axum::Error),
}
