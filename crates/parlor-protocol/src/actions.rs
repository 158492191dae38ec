//! Action identifiers for the wire envelope.
//!
//! Every [`Envelope`](crate::Envelope) carries one of these strings in its
//! `action` field. Inbound envelopes with an action the server does not
//! recognize are rebroadcast verbatim to the sender's room (chat and other
//! client-to-client traffic rides on that path).

/// Client → Server: submit a tic-tac-toe move.
pub const TICTACTOE_MOVE: &str = "TICTACTOE_MOVE";

/// Server → Clients: full tic-tac-toe state snapshot.
pub const TICTACTOE_GAME_STATE: &str = "TICTACTOE_GAME_STATE";

/// Client → Server: submit a chess move. Also used Server → Clients for
/// the move-applied event carrying the authoritative FEN.
pub const CHESS_MOVE: &str = "CHESS_MOVE";

/// Server → Clients: full chess position as a FEN string.
pub const CHESS_GAME_STATE: &str = "CHESS_GAME_STATE";

/// Client → Server: create a room with an AI opponent.
pub const CREATE_ROOM_WITH_AI: &str = "CREATE_ROOM_WITH_AI";

/// Server → Client: a room was created on the caller's behalf.
pub const ROOM_CREATED: &str = "ROOM_CREATED";

/// Server → Clients: role/membership snapshot after a membership change.
pub const MARK_UPDATE: &str = "MARK_UPDATE";

/// Server → Clients: a player's connection was bound to the room.
pub const CONNECTED_ON_SERVER: &str = "CONNECTED_ON_SERVER";

/// Server → Clients: a player's connection dropped.
pub const USER_LEFT_ROOM: &str = "USER_LEFT_ROOM";

/// Server → Clients: both seats are filled, play can begin.
pub const START_GAME: &str = "START_GAME";
