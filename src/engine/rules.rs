//! End-of-game detection and status text, shared by the session and the
//! authoritative peer.

use std::fmt;

use crate::engine::board::Board;
use crate::engine::oracle::{MoveOracle, has_any_move};
use crate::engine::types::{Move, PieceKind, Side};

/// Why a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndReason {
    /// The side to move had no legal move.
    NoLegalMoves,
    /// A chess king was taken (possible under the rule-light oracle).
    KingCaptured,
    /// The authoritative peer declared the game over.
    Reported,
    Resigned,
    OpponentLost,
}

impl EndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::NoLegalMoves => "no_legal_moves",
            EndReason::KingCaptured => "king_captured",
            EndReason::Reported => "reported",
            EndReason::Resigned => "resigned",
            EndReason::OpponentLost => "opponent_lost",
        }
    }
}

/// Final result of a game. `winner == None` is a draw or an abandoned game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub winner: Option<Side>,
    pub reason: EndReason,
}

impl Outcome {
    pub fn new(winner: Option<Side>, reason: EndReason) -> Self {
        Self { winner, reason }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.reason, self.winner) {
            (EndReason::OpponentLost, _) => write!(f, "Opponent disconnected"),
            (EndReason::Resigned, Some(w)) => write!(f, "{} resigned, {} wins", cap(!w), cap(w)),
            (_, Some(w)) => write!(f, "{} wins", cap(w)),
            (_, None) => write!(f, "Draw"),
        }
    }
}

/// Detect the end of the game after `mover` played `mv` on `board`
/// (the board already reflects the move).
pub fn outcome_after(oracle: &dyn MoveOracle, board: &Board, mv: &Move, mover: Side) -> Option<Outcome> {
    if mv
        .captured
        .as_ref()
        .is_some_and(|p| p.kind == PieceKind::King)
    {
        return Some(Outcome::new(Some(mover), EndReason::KingCaptured));
    }
    if !has_any_move(oracle, board, !mover) {
        return Some(Outcome::new(Some(mover), EndReason::NoLegalMoves));
    }
    None
}

/// Status line for an ongoing or finished game.
pub fn status_text(to_move: Side, outcome: Option<&Outcome>) -> String {
    match outcome {
        Some(o) => o.to_string(),
        None => format!("{} to move", cap(to_move)),
    }
}

/// Side to move named by a `"<Side> to move"` status line.
pub fn turn_in_status(status: &str) -> Option<Side> {
    let side = status.trim().strip_suffix(" to move")?;
    Side::from_wire(&side.to_lowercase())
}

fn cap(side: Side) -> &'static str {
    match side {
        Side::White => "White",
        Side::Black => "Black",
    }
}
