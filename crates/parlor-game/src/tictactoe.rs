//! The tic-tac-toe session state machine.
//!
//! Mutations are serialized through a single-consumer queue: callers send
//! a [`MoveRequest`] and await the reply on a oneshot channel, while one
//! actor task owns the check-then-apply critical section. Concurrent move
//! submissions from both players can therefore never interleave their
//! board reads and writes — the final board always equals one of the two
//! sequential orderings.
//!
//! Derived state (board, turn, winner, active flag) lives behind an
//! `RwLock` so snapshot reads never touch the mutation queue.

use std::fmt;
use std::sync::Arc;

use parlor_protocol::TurnStateSnapshot;
use serde::{Deserialize, Serialize};
use tokio::sync::{RwLock, mpsc, oneshot};

use crate::{GameError, Role};

/// Board side length. The win-line table below is written for 3.
const BOARD_SIZE: usize = 3;

/// Queue depth for pending move requests. Two players and an AI can only
/// have a handful of moves in flight; overflow waits.
const UPDATE_QUEUE_SIZE: usize = 8;

/// All eight winning lines: rows, columns, both diagonals.
const WIN_LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// A player's mark on the board.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::O => "O",
        }
    }

    /// Maps a room role onto a board mark. Chess roles have no seat at a
    /// tic-tac-toe board and are treated as "never your turn".
    pub fn from_role(role: Role) -> Result<Self, GameError> {
        match role {
            Role::X => Ok(Self::X),
            Role::O => Ok(Self::O),
            Role::White | Role::Black => Err(GameError::WrongTurn),
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal result of a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Mark(Mark),
    Draw,
}

impl Winner {
    /// Wire token: the winning mark, or `"Draw"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mark(mark) => mark.as_str(),
            Self::Draw => "Draw",
        }
    }
}

type Board = [[Option<Mark>; BOARD_SIZE]; BOARD_SIZE];

/// The authoritative game data. Only the actor task writes the board
/// through a move; resets and AI replies take the write lock directly.
#[derive(Debug, Clone)]
struct TurnState {
    board: Board,
    turn: Mark,
    winner: Option<Winner>,
    active: bool,
}

impl TurnState {
    fn new() -> Self {
        Self {
            board: Board::default(),
            turn: Mark::X,
            winner: None,
            active: false,
        }
    }
}

/// A mutation request travelling through the queue.
struct MoveRequest {
    mark: Mark,
    row: usize,
    col: usize,
    reply: oneshot::Sender<Result<(), GameError>>,
}

/// Handle to one room's tic-tac-toe session. Cheap to clone — clones share
/// the same board and the same mutation queue.
#[derive(Clone)]
pub struct TicTacToe {
    updates: mpsc::Sender<MoveRequest>,
    state: Arc<RwLock<TurnState>>,
}

impl TicTacToe {
    /// Creates a fresh, inactive game and spawns its mutation actor.
    /// The game activates when the room fills its second seat.
    pub fn new() -> Self {
        let state = Arc::new(RwLock::new(TurnState::new()));
        let (tx, rx) = mpsc::channel(UPDATE_QUEUE_SIZE);
        tokio::spawn(run_actor(Arc::clone(&state), rx));
        Self { updates: tx, state }
    }

    /// Submits a move and waits for the authoritative verdict.
    ///
    /// # Errors
    /// [`GameError::NotActive`], [`GameError::OutOfBounds`],
    /// [`GameError::OccupiedCell`], or [`GameError::WrongTurn`]; the board
    /// is untouched in every error case.
    pub async fn apply_move(
        &self,
        role: Role,
        row: usize,
        col: usize,
    ) -> Result<(), GameError> {
        let mark = Mark::from_role(role)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        self.updates
            .send(MoveRequest {
                mark,
                row,
                col,
                reply: reply_tx,
            })
            .await
            .map_err(|_| GameError::Unavailable)?;
        reply_rx.await.map_err(|_| GameError::Unavailable)?
    }

    /// Computes and applies the AI's reply for whichever mark is to move.
    ///
    /// Exhaustive minimax over the remaining empty cells — the full game
    /// tree is searched, no depth cutoff. Ties break toward the first
    /// maximal-score move in row-major order. No-op if the game is not
    /// active.
    pub async fn ai_move(&self) {
        let mut state = self.state.write().await;
        if !state.active {
            return;
        }

        let ai = state.turn;
        let mut best_score = i32::MIN;
        let mut best_move = None;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                if state.board[row][col].is_none() {
                    state.board[row][col] = Some(ai);
                    let score = minimax(&mut state.board, 1, false, ai);
                    state.board[row][col] = None;
                    if score > best_score {
                        best_score = score;
                        best_move = Some((row, col));
                    }
                }
            }
        }

        if let Some((row, col)) = best_move {
            place_and_settle(&mut state, ai, row, col);
        }
    }

    /// Current state as the wire snapshot.
    pub async fn snapshot(&self) -> TurnStateSnapshot {
        let state = self.state.read().await;
        let mut board: [[String; 3]; 3] = Default::default();
        for (r, row) in state.board.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                board[r][c] = cell.map_or(String::new(), |m| {
                    m.as_str().to_string()
                });
            }
        }
        TurnStateSnapshot {
            board,
            turn: state.turn.as_str().to_string(),
            winner: state
                .winner
                .map_or(String::new(), |w| w.as_str().to_string()),
            is_active: state.active,
        }
    }

    pub async fn is_active(&self) -> bool {
        self.state.read().await.active
    }

    /// Flips the active flag without touching the board. Called by the
    /// room when its second seat fills.
    pub async fn set_active(&self, active: bool) {
        self.state.write().await.active = active;
    }

    /// Returns the game to its initial position: empty board, first
    /// mover's turn, no winner. `active` decides whether play resumes
    /// immediately (post-game rematch) or waits for players (membership
    /// dropped below two).
    pub async fn reset(&self, active: bool) {
        let mut state = self.state.write().await;
        state.board = Board::default();
        state.turn = Mark::X;
        state.winner = None;
        state.active = active;
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

/// The actor loop: drains the queue, evaluating one mutation at a time.
async fn run_actor(
    state: Arc<RwLock<TurnState>>,
    mut updates: mpsc::Receiver<MoveRequest>,
) {
    while let Some(req) = updates.recv().await {
        let result = {
            let mut state = state.write().await;
            try_apply(&mut state, req.mark, req.row, req.col)
        };
        // Caller may have given up (connection died) — nothing to do.
        let _ = req.reply.send(result);
    }
}

/// The check-then-apply critical section.
fn try_apply(
    state: &mut TurnState,
    mark: Mark,
    row: usize,
    col: usize,
) -> Result<(), GameError> {
    if !state.active {
        return Err(GameError::NotActive);
    }
    if row >= BOARD_SIZE || col >= BOARD_SIZE {
        return Err(GameError::OutOfBounds);
    }
    if state.board[row][col].is_some() {
        return Err(GameError::OccupiedCell);
    }
    if state.turn != mark {
        return Err(GameError::WrongTurn);
    }

    place_and_settle(state, mark, row, col);
    Ok(())
}

/// Places a mark and settles the aftermath: win, draw, or turn flip.
fn place_and_settle(state: &mut TurnState, mark: Mark, row: usize, col: usize) {
    state.board[row][col] = Some(mark);
    if has_winning_line(&state.board, mark) {
        state.winner = Some(Winner::Mark(mark));
        state.active = false;
        tracing::debug!(winner = %mark, "game won");
    } else if board_full(&state.board) {
        state.winner = Some(Winner::Draw);
        state.active = false;
        tracing::debug!("game drawn");
    } else {
        state.turn = mark.opponent();
    }
}

fn has_winning_line(board: &Board, mark: Mark) -> bool {
    WIN_LINES.iter().any(|line| {
        line.iter().all(|&(r, c)| board[r][c] == Some(mark))
    })
}

fn board_full(board: &Board) -> bool {
    board
        .iter()
        .all(|row| row.iter().all(|cell| cell.is_some()))
}

/// Minimax score of the position for `ai`, assuming both sides play
/// perfectly. Wins are better when nearer (`10 - depth`), losses better
/// when farther (`depth - 10`), draws are zero.
fn minimax(board: &mut Board, depth: i32, maximizing: bool, ai: Mark) -> i32 {
    if has_winning_line(board, ai) {
        return 10 - depth;
    }
    if has_winning_line(board, ai.opponent()) {
        return depth - 10;
    }
    if board_full(board) {
        return 0;
    }

    let (mover, mut best) = if maximizing {
        (ai, i32::MIN)
    } else {
        (ai.opponent(), i32::MAX)
    };
    for row in 0..BOARD_SIZE {
        for col in 0..BOARD_SIZE {
            if board[row][col].is_none() {
                board[row][col] = Some(mover);
                let score = minimax(board, depth + 1, !maximizing, ai);
                board[row][col] = None;
                best = if maximizing {
                    best.max(score)
                } else {
                    best.min(score)
                };
            }
        }
    }
    best
}
