//! Transport layer for Parlor: a duplex message channel over an upgraded
//! WebSocket.
//!
//! An accepted socket is split into two halves:
//!
//! - [`WsSender`] — cheaply cloneable write half. Shared by the write pump
//!   (draining a player's outbound queue) and the heartbeat loop (liveness
//!   pings).
//! - [`WsReceiver`] — exclusively owned read half, consumed by the
//!   connection's read loop.
//!
//! The split is what lets a connection block on reading while writes and
//! pings proceed independently; a single locked socket would serialize all
//! three loops onto one await point.

mod error;
mod websocket;

pub use error::TransportError;
pub use websocket::{Incoming, WsReceiver, WsSender, split};
