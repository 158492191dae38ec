//! Session state machines for Parlor.
//!
//! A room owns exactly one [`GameSession`] — the authoritative, serialized
//! owner of that room's game data. Two variants exist:
//!
//! - [`TicTacToe`] — a self-contained turn/board engine. Mutations flow
//!   through a single-consumer request queue (an internal actor task), so
//!   only one move is ever being evaluated at a time no matter how many
//!   connections submit concurrently. Includes an exhaustive-minimax AI
//!   opponent.
//! - [`ChessSession`] — a delegating engine. Move legality, state advance,
//!   and terminal detection are forwarded to the `shakmaty` rules library;
//!   this crate stores the position behind a per-instance lock and mirrors
//!   the derived active/winner state.
//!
//! Which variant a room runs is a closed tagged union ([`GameSession`]),
//! dispatched by pattern matching at every call site.

mod chess;
mod error;
mod session;
mod tictactoe;
mod types;

pub use chess::{ChessMoveOutcome, ChessSession, GameStatus};
pub use error::GameError;
pub use session::GameSession;
pub use tictactoe::{Mark, TicTacToe, Winner};
pub use types::{GameKind, Role, UnknownGameKind};
