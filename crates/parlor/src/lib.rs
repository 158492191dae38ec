//! Parlor: a real-time, two-party turn-based game session server.
//!
//! Clients join a shared room, exchange moves over a persistent WebSocket,
//! and receive authoritative, serialized state updates. This crate ties
//! the layers together:
//!
//! - a thin HTTP surface (player registration, room create/join) and the
//!   WebSocket upgrade route;
//! - the per-connection lifecycle: read loop, write pump, heartbeat loop,
//!   and the disconnect → grace period → eviction path;
//! - inbound dispatch from wire actions to the room's game session, with
//!   deferred follow-ups (delayed game reset, delayed eviction).
//!
//! ```text
//! transport (socket) → protocol (envelope) → dispatch → room/game
//!                                                 ↓
//!                                          fanout → member queues
//! ```

mod config;
mod dispatch;
mod error;
mod http;
mod lifecycle;
mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{AppState, Server, SharedState, router};
