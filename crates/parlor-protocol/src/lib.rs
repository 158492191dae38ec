//! Wire protocol for Parlor.
//!
//! This crate defines the messages that travel between the server and its
//! clients:
//!
//! - **Types** ([`Envelope`], [`PlayerSummary`], the move payloads and
//!   state snapshots) — the structures that get serialized onto the wire.
//! - **Actions** ([`actions`]) — the string identifiers that tag each
//!   envelope and drive dispatch.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! The protocol layer sits between transport (raw bytes) and the room
//! layer (player and game context). It knows nothing about connections,
//! rooms, or game rules — only message shapes.

pub mod actions;
mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use types::{
    ChessMoveApplied, ChessMovePayload, Envelope, ErrorEnvelope, MarkUpdate,
    PlayerSummary, RoomSummary, TurnMovePayload, TurnStateSnapshot,
};
