//! Shared domain types: game kinds and player roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of game a room runs. Wire token: `"tictactoe"` / `"chess"`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    TicTacToe,
    Chess,
}

impl GameKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TicTacToe => "tictactoe",
            Self::Chess => "chess",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameKind {
    type Err = UnknownGameKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tictactoe" => Ok(Self::TicTacToe),
            "chess" => Ok(Self::Chess),
            other => Err(UnknownGameKind(other.to_string())),
        }
    }
}

/// Error for an unrecognized game-kind token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown game type: {0}")]
pub struct UnknownGameKind(pub String);

/// The game-specific identity a player occupies in a room.
///
/// Each game kind has a first-mover role and a second-mover role; arrival
/// order decides which seat a joining player takes. Wire tokens follow the
/// game's own convention (`"X"`/`"O"`, `"white"`/`"black"`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Role {
    #[serde(rename = "X")]
    X,
    #[serde(rename = "O")]
    O,
    #[serde(rename = "white")]
    White,
    #[serde(rename = "black")]
    Black,
}

impl Role {
    /// The role that moves first for the given game kind.
    pub fn first(kind: GameKind) -> Self {
        match kind {
            GameKind::TicTacToe => Self::X,
            GameKind::Chess => Self::White,
        }
    }

    /// The role that moves second for the given game kind.
    pub fn second(kind: GameKind) -> Self {
        match kind {
            GameKind::TicTacToe => Self::O,
            GameKind::Chess => Self::Black,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::O => "O",
            Self::White => "white",
            Self::Black => "black",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
