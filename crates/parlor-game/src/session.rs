//! The closed union over the two session state machine variants.

use crate::{ChessSession, GameKind, TicTacToe};

/// One room's authoritative game instance.
///
/// Call sites that need variant-specific behavior (move handling, state
/// snapshots) pattern-match on this enum; the shared lifecycle operations
/// are forwarded here.
pub enum GameSession {
    TicTacToe(TicTacToe),
    Chess(ChessSession),
}

impl GameSession {
    /// Constructs the fresh session for a game kind.
    pub fn new(kind: GameKind) -> Self {
        match kind {
            GameKind::TicTacToe => Self::TicTacToe(TicTacToe::new()),
            GameKind::Chess => Self::Chess(ChessSession::new()),
        }
    }

    pub fn kind(&self) -> GameKind {
        match self {
            Self::TicTacToe(_) => GameKind::TicTacToe,
            Self::Chess(_) => GameKind::Chess,
        }
    }

    /// Whether the embedded state machine reports itself active.
    pub async fn is_active(&self) -> bool {
        match self {
            Self::TicTacToe(game) => game.is_active().await,
            Self::Chess(game) => game.is_active().await,
        }
    }

    pub async fn set_active(&self, active: bool) {
        match self {
            Self::TicTacToe(game) => game.set_active(active).await,
            Self::Chess(game) => game.set_active(active).await,
        }
    }

    /// Returns the game to its initial position.
    pub async fn reset(&self, active: bool) {
        match self {
            Self::TicTacToe(game) => game.reset(active).await,
            Self::Chess(game) => game.reset(active).await,
        }
    }
}
