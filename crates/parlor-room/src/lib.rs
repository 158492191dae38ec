//! Room and player management for Parlor.
//!
//! Two registries sit at well-defined locking layers:
//!
//! - [`PlayerRegistry`] — every known player identity, independent of any
//!   room, with last-activity tracking and an inactivity sweep.
//! - [`RoomManager`] — creates, looks up, and destroys [`Room`]s.
//!
//! Each registry guards its map with its own lock, held only across the
//! map operation itself — never while engaging a room's lock or a game
//! session, so the two levels can never deadlock against each other.
//! A [`Room`] in turn guards its membership and activity flag with its own
//! lock, and exclusively owns its game session.
//!
//! [`fanout`] delivers one message to every live member of a room without
//! ever blocking on a slow consumer: a full outbound queue drops that
//! member from the room instead (backpressure-by-eviction).

pub mod fanout;

mod error;
mod manager;
mod player;
mod room;

pub use error::RoomError;
pub use manager::{RoomManager, generate_code};
pub use player::{
    AI_PLAYER_ID, ConnectionStatus, EnqueueOutcome, OutboundSender, Player,
    PlayerRegistry,
};
pub use room::{MAX_PLAYERS, Room};
