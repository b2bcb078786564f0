//! Move legality oracles.
//!
//! The session asks an oracle before applying anything:
//!   - `LocalOracle`: rule-light legality used without an authoritative peer.
//!   - `RemoteOracle`: defers every decision to the authoritative peer.

use crate::engine::board::Board;
use crate::engine::types::{Move, PieceKind, Side, Square, Variant};

// =========================================================================
// MoveOracle trait
// =========================================================================

/// Outcome of a legality check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// The move is legal; carries the fully resolved move.
    Legal(Move),
    Illegal,
    /// Only the authoritative peer can decide.
    Deferred,
}

/// The legality interface the session plugs rule sets into.
pub trait MoveOracle: Send + Sync {
    /// Legal destinations of the piece on `from`, or `None` when the
    /// answer must come from the authoritative peer.
    fn legal_destinations(&self, board: &Board, from: Square, side: Side) -> Option<Vec<Square>>;

    /// Decide whether `side` may move the piece on `from` to `to`.
    fn check(&self, board: &Board, from: Square, to: Square, side: Side) -> Verdict;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Whether `side` has at least one legal move. Deferred oracles answer `true`.
pub fn has_any_move(oracle: &dyn MoveOracle, board: &Board, side: Side) -> bool {
    board
        .pieces(side)
        .any(|(from, _)| match oracle.legal_destinations(board, from, side) {
            Some(dests) => !dests.is_empty(),
            None => true,
        })
}

/// Every legal move of `side`, in board order. Empty for deferred oracles.
pub fn all_moves(oracle: &dyn MoveOracle, board: &Board, side: Side) -> Vec<Move> {
    let mut moves = Vec::new();
    for (from, _) in board.pieces(side) {
        for to in oracle.legal_destinations(board, from, side).unwrap_or_default() {
            if let Verdict::Legal(mv) = oracle.check(board, from, to, side) {
                moves.push(mv);
            }
        }
    }
    moves
}

// =========================================================================
// RemoteOracle
// =========================================================================

/// Pass-through oracle: legality lives on the authoritative peer.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemoteOracle;

impl MoveOracle for RemoteOracle {
    fn legal_destinations(&self, _board: &Board, _from: Square, _side: Side) -> Option<Vec<Square>> {
        None
    }

    fn check(&self, _board: &Board, _from: Square, _to: Square, _side: Side) -> Verdict {
        Verdict::Deferred
    }

    fn name(&self) -> &str {
        "RemoteOracle"
    }
}

// =========================================================================
// LocalOracle
// =========================================================================

/// Rule-light oracle for offline play.
///
/// Pawns (chess) and men (checkers) follow their movement rules, and
/// checkers pieces stay on dark squares. Every other kind may go to any
/// square not held by its own side: this keeps offline play moving without
/// a full rule set and is not a correctness guarantee.
#[derive(Debug, Clone, Copy)]
pub struct LocalOracle {
    variant: Variant,
}

impl LocalOracle {
    pub fn new(variant: Variant) -> Self {
        Self { variant }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    fn resolve(&self, board: &Board, from: Square, to: Square, side: Side) -> Option<Move> {
        let piece = board.piece_at(from).filter(|p| p.side == side)?;
        if from == to {
            return None;
        }
        let target = board.piece_at(to);
        if target.is_some_and(|t| t.side == side) {
            return None;
        }
        if self.variant == Variant::Checkers && !to.is_dark() {
            return None;
        }

        let d_row = to.row() as i8 - from.row() as i8;
        let d_col = to.col() as i8 - from.col() as i8;
        let fwd = side.forward();

        let capture_at = match piece.kind {
            PieceKind::Pawn => {
                let start_row = if side == Side::White { 6 } else { 1 };
                match (d_row, d_col.abs(), target) {
                    (r, 0, None) if r == fwd => None,
                    (r, 0, None) if r == 2 * fwd && from.row() == start_row => {
                        let mid = from.offset(fwd, 0)?;
                        if board.piece_at(mid).is_some() {
                            return None;
                        }
                        None
                    }
                    (r, 1, Some(_)) if r == fwd => Some(to),
                    _ => return None,
                }
            }
            PieceKind::Man => {
                if target.is_some() {
                    return None;
                }
                match (d_row, d_col.abs()) {
                    (r, 1) if r == fwd => None,
                    (r, 2) if r == 2 * fwd => {
                        let mid = from.offset(fwd, d_col / 2)?;
                        match board.piece_at(mid) {
                            Some(p) if p.side != side => Some(mid),
                            _ => return None,
                        }
                    }
                    _ => return None,
                }
            }
            _ => target.map(|_| to),
        };

        let piece = piece.clone();
        Some(match capture_at {
            Some(at) => {
                let captured = board.piece_at(at)?.clone();
                Move::capture(from, to, piece, captured, at)
            }
            None => Move::quiet(from, to, piece),
        })
    }
}

impl MoveOracle for LocalOracle {
    fn legal_destinations(&self, board: &Board, from: Square, side: Side) -> Option<Vec<Square>> {
        Some(
            Square::all()
                .filter(|&to| self.resolve(board, from, to, side).is_some())
                .collect(),
        )
    }

    fn check(&self, board: &Board, from: Square, to: Square, side: Side) -> Verdict {
        match self.resolve(board, from, to, side) {
            Some(mv) => Verdict::Legal(mv),
            None => Verdict::Illegal,
        }
    }

    fn name(&self) -> &str {
        "LocalOracle"
    }
}

// =========================================================================
// Tests
// =========================================================================
