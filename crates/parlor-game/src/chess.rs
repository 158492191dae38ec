//! The chess session state machine.
//!
//! Unlike the tic-tac-toe engine, this variant owns no rules of its own:
//! legality, state advance, and terminal detection are delegated to the
//! `shakmaty` library. The core keeps the position behind a per-instance
//! lock (the position type is not safe for concurrent mutation), mirrors
//! the derived active/winner state after each successful move, and hands
//! out the serialized FEN as the single source of truth for clients.

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Position};
use tokio::sync::Mutex;

use crate::{GameError, Role};

/// Terminal status of the position after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Role },
    Stalemate,
    /// Any other draw the rules engine detects (insufficient material).
    Draw,
}

impl GameStatus {
    /// Wire token carried in the move-applied event's `result` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ongoing => "ongoing",
            Self::Checkmate { .. } => "checkmate",
            Self::Stalemate => "stalemate",
            Self::Draw => "draw",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

/// Result of a successful mutation: the authoritative position and the
/// status the rules engine reported for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChessMoveOutcome {
    pub fen: String,
    pub status: GameStatus,
}

struct ChessInner {
    pos: Chess,
    active: bool,
    winner: Option<GameStatus>,
}

/// Handle to one room's chess session.
pub struct ChessSession {
    inner: Mutex<ChessInner>,
}

impl ChessSession {
    /// A fresh game from the standard starting position, inactive until
    /// the room fills its second seat.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ChessInner {
                pos: Chess::default(),
                active: false,
                winner: None,
            }),
        }
    }

    /// Submits a move for the given role.
    ///
    /// Checks run in order: the session must be active, the role must
    /// match the side to move, a promoting origin→destination pair must
    /// carry a promotion piece, and finally the fully-qualified UCI move
    /// must be legal. On success the position advances and the terminal
    /// status is mirrored into the session.
    ///
    /// # Errors
    /// [`GameError::NotActive`], [`GameError::WrongTurn`],
    /// [`GameError::PromotionRequired`], or [`GameError::IllegalMove`];
    /// the position is unchanged in every error case.
    pub async fn apply_move(
        &self,
        role: Role,
        from: &str,
        to: &str,
        promotion: Option<&str>,
    ) -> Result<ChessMoveOutcome, GameError> {
        let mut inner = self.inner.lock().await;
        if !inner.active {
            return Err(GameError::NotActive);
        }

        let side = match role {
            Role::White => Color::White,
            Role::Black => Color::Black,
            Role::X | Role::O => return Err(GameError::WrongTurn),
        };
        if inner.pos.turn() != side {
            return Err(GameError::WrongTurn);
        }

        let base = format!("{from}{to}");
        let needs_promotion = inner.pos.legal_moves().iter().any(|m| {
            m.is_promotion()
                && m.to_uci(CastlingMode::Standard)
                    .to_string()
                    .starts_with(&base)
        });
        if needs_promotion && promotion.is_none() {
            return Err(GameError::PromotionRequired);
        }

        let uci_str = match promotion {
            Some(piece) => format!("{base}{piece}"),
            None => base,
        };
        let uci = UciMove::from_ascii(uci_str.as_bytes())
            .map_err(|e| GameError::IllegalMove(e.to_string()))?;
        let mv = uci
            .to_move(&inner.pos)
            .map_err(|e| GameError::IllegalMove(e.to_string()))?;
        let next = inner
            .pos
            .clone()
            .play(&mv)
            .map_err(|e| GameError::IllegalMove(e.to_string()))?;
        inner.pos = next;

        let status = derive_status(&inner.pos);
        if status.is_terminal() {
            inner.active = false;
            inner.winner = Some(status);
            tracing::debug!(result = status.as_str(), "chess game finished");
        }

        Ok(ChessMoveOutcome {
            fen: fen_of(&inner.pos),
            status,
        })
    }

    /// The side to move, as a room role.
    pub async fn current_turn(&self) -> Role {
        match self.inner.lock().await.pos.turn() {
            Color::White => Role::White,
            Color::Black => Role::Black,
        }
    }

    /// Every legal move in UCI notation.
    pub async fn legal_moves(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner
            .pos
            .legal_moves()
            .iter()
            .map(|m| m.to_uci(CastlingMode::Standard).to_string())
            .collect()
    }

    /// Serializes the authoritative position.
    pub async fn fen(&self) -> String {
        fen_of(&self.inner.lock().await.pos)
    }

    pub async fn is_active(&self) -> bool {
        self.inner.lock().await.active
    }

    pub async fn set_active(&self, active: bool) {
        self.inner.lock().await.active = active;
    }

    /// Replaces the position with a fresh standard game.
    pub async fn reset(&self, active: bool) {
        let mut inner = self.inner.lock().await;
        inner.pos = Chess::default();
        inner.winner = None;
        inner.active = active;
    }
}

impl Default for ChessSession {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_status(pos: &Chess) -> GameStatus {
    if pos.is_checkmate() {
        // The side to move has no escape; the side that just moved wins.
        let winner = match pos.turn() {
            Color::White => Role::Black,
            Color::Black => Role::White,
        };
        GameStatus::Checkmate { winner }
    } else if pos.is_stalemate() {
        GameStatus::Stalemate
    } else if pos.is_insufficient_material() {
        GameStatus::Draw
    } else {
        GameStatus::Ongoing
    }
}

fn fen_of(pos: &Chess) -> String {
    Fen(pos.clone().into_setup(EnPassantMode::Legal)).to_string()
}
