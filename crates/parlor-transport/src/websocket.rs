//! Split WebSocket halves over an axum-upgraded socket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::Mutex;

use crate::TransportError;

/// One frame received from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// An application message payload.
    Message(Vec<u8>),
    /// A ping or pong control frame. Carries nothing to process, but is
    /// proof the peer is alive — read loops use it to re-arm their idle
    /// deadline. Ping replies are handled by the underlying stack.
    Keepalive,
}

/// Splits an upgraded socket into its write and read halves.
pub fn split(socket: WebSocket) -> (WsSender, WsReceiver) {
    let (sink, stream) = socket.split();
    (
        WsSender {
            sink: Arc::new(Mutex::new(sink)),
        },
        WsReceiver { stream },
    )
}

/// The write half of a connection. Clone freely; all clones share one
/// underlying sink guarded by a mutex held only per write.
#[derive(Clone)]
pub struct WsSender {
    sink: Arc<Mutex<SplitSink<WebSocket, Message>>>,
}

impl WsSender {
    /// Writes one message to the peer.
    ///
    /// UTF-8 payloads (all JSON traffic) go out as text frames so browser
    /// clients and debugging proxies can read them; anything else falls
    /// back to a binary frame.
    pub async fn send(&self, data: &[u8]) -> Result<(), TransportError> {
        let msg = match std::str::from_utf8(data) {
            Ok(text) => Message::Text(text.into()),
            Err(_) => Message::Binary(data.to_vec().into()),
        };
        self.sink
            .lock()
            .await
            .send(msg)
            .await
            .map_err(TransportError::SendFailed)
    }

    /// Sends a liveness probe. A failure means the peer is unreachable
    /// and the caller should begin connection teardown.
    pub async fn ping(&self) -> Result<(), TransportError> {
        self.sink
            .lock()
            .await
            .send(Message::Ping(Vec::new().into()))
            .await
            .map_err(TransportError::SendFailed)
    }

    /// Sends a close frame to the peer.
    pub async fn close(&self) -> Result<(), TransportError> {
        self.sink
            .lock()
            .await
            .send(Message::Close(None))
            .await
            .map_err(TransportError::SendFailed)
    }
}

/// The read half of a connection. Owned by exactly one read loop.
pub struct WsReceiver {
    stream: SplitStream<WebSocket>,
}

impl WsReceiver {
    /// Receives the next frame from the peer.
    ///
    /// Returns `Ok(None)` on a clean close.
    pub async fn recv(
        &mut self,
    ) -> Result<Option<Incoming>, TransportError> {
        match self.stream.next().await {
            Some(Ok(Message::Text(text))) => {
                Ok(Some(Incoming::Message(text.as_bytes().to_vec())))
            }
            Some(Ok(Message::Binary(data))) => {
                Ok(Some(Incoming::Message(data.to_vec())))
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                Ok(Some(Incoming::Keepalive))
            }
            Some(Ok(Message::Close(_))) | None => Ok(None),
            Some(Err(e)) => Err(TransportError::ReceiveFailed(e)),
        }
    }
}
