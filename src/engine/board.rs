//! 8×8 mailbox board shared by both variants.
//!
//! `Board` stores an optional `Piece` per square. It knows nothing about
//! legality: `apply` moves pieces around and the oracle decides whether a
//! move may be applied at all.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::engine::types::{Move, Piece, PieceKind, SessionError, Side, Square, Variant};

// ---------------------------------------------------------------------------
// SymbolTable
// ---------------------------------------------------------------------------

/// Display symbols per (side, kind).
#[derive(Clone, Debug)]
pub struct SymbolTable {
    entries: HashMap<(Side, PieceKind), String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register a symbol, replacing any earlier one for the same piece.
    pub fn with(mut self, side: Side, kind: PieceKind, symbol: &str) -> Self {
        self.entries.insert((side, kind), symbol.to_string());
        self
    }

    /// Symbol for a piece, `"?"` when unregistered.
    pub fn symbol(&self, side: Side, kind: PieceKind) -> &str {
        self.entries.get(&(side, kind)).map_or("?", String::as_str)
    }

    pub fn chess() -> Self {
        Self::new()
            .with(Side::White, PieceKind::Pawn, "♟️")
            .with(Side::White, PieceKind::Rook, "♜")
            .with(Side::White, PieceKind::Knight, "♞")
            .with(Side::White, PieceKind::Bishop, "♝")
            .with(Side::White, PieceKind::Queen, "♛")
            .with(Side::White, PieceKind::King, "♚")
            .with(Side::Black, PieceKind::Pawn, "♙")
            .with(Side::Black, PieceKind::Rook, "♖")
            .with(Side::Black, PieceKind::Knight, "♘")
            .with(Side::Black, PieceKind::Bishop, "♗")
            .with(Side::Black, PieceKind::Queen, "♕")
            .with(Side::Black, PieceKind::King, "♔")
    }

    pub fn checkers() -> Self {
        Self::new()
            .with(Side::White, PieceKind::Man, "⚪")
            .with(Side::White, PieceKind::Crowned, "👑")
            .with(Side::Black, PieceKind::Man, "⚫")
            .with(Side::Black, PieceKind::Crowned, "👑")
    }

    /// Stock table for a variant.
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Chess => Self::chess(),
            Variant::Checkers => Self::checkers(),
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::chess()
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// One occupied cell in the wire board format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePiece {
    pub color: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub symbol: String,
}

/// Row-major 8×8 grid of optional pieces, as carried by `game_joined` and
/// `move_made`.
pub type WireBoard = Vec<Vec<Option<WirePiece>>>;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

const N: usize = Square::SIZE as usize;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Piece>; N]; N],
}

impl Board {
    /// A board with no pieces.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Standard starting position for a variant.
    pub fn initial_layout(variant: Variant, symbols: &SymbolTable) -> Self {
        let mut board = Board::empty();
        let mut put = |row: usize, col: usize, side: Side, kind: PieceKind| {
            board.cells[row][col] = Some(Piece::new(side, kind, symbols.symbol(side, kind)));
        };

        match variant {
            Variant::Chess => {
                const BACK_RANK: [PieceKind; N] = [
                    PieceKind::Rook,
                    PieceKind::Knight,
                    PieceKind::Bishop,
                    PieceKind::Queen,
                    PieceKind::King,
                    PieceKind::Bishop,
                    PieceKind::Knight,
                    PieceKind::Rook,
                ];
                for (col, &kind) in BACK_RANK.iter().enumerate() {
                    put(0, col, Side::Black, kind);
                    put(1, col, Side::Black, PieceKind::Pawn);
                    put(6, col, Side::White, PieceKind::Pawn);
                    put(7, col, Side::White, kind);
                }
            }
            Variant::Checkers => {
                for row in 0..N {
                    for col in 0..N {
                        if (row + col) % 2 == 0 {
                            continue;
                        }
                        match row {
                            0..=2 => put(row, col, Side::Black, PieceKind::Man),
                            5..=7 => put(row, col, Side::White, PieceKind::Man),
                            _ => {}
                        }
                    }
                }
            }
        }
        board
    }

    /// Piece on a square, if any.
    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<&Piece> {
        self.cells[sq.row() as usize][sq.col() as usize].as_ref()
    }

    /// Place (or clear) a square directly. Used for setting up positions.
    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.cells[sq.row() as usize][sq.col() as usize] = piece;
    }

    /// All pieces of one side with their squares, row-major.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (Square, &Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.piece_at(sq) {
            Some(p) if p.side == side => Some((sq, p)),
            _ => None,
        })
    }

    /// Number of occupied squares.
    pub fn count(&self) -> usize {
        Square::all().filter(|&sq| self.piece_at(sq).is_some()).count()
    }

    /// Apply a move: the piece leaves `from`, any piece on `captured_at`
    /// is removed, and the piece lands on `to`.
    ///
    /// Off-board coordinates are rejected earlier by `Square::new`. An empty
    /// `from` fails before any cell changes, so a failed call leaves the
    /// board untouched. Legality is not checked here.
    pub fn apply(&mut self, mv: &Move) -> Result<(), SessionError> {
        let Some(piece) = self.piece_at(mv.from).cloned() else {
            return Err(SessionError::EmptySquare(mv.from));
        };

        self.set(mv.from, None);
        if let Some(at) = mv.captured_at
            && at != mv.to
        {
            self.set(at, None);
        }
        self.set(mv.to, Some(piece));
        Ok(())
    }

    // -----------------------------------------------------------------
    // Wire conversion
    // -----------------------------------------------------------------

    /// Serialize to the wire board format.
    pub fn to_wire(&self) -> WireBoard {
        self.cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        cell.as_ref().map(|p| WirePiece {
                            color: p.side.as_str().to_string(),
                            kind: p.kind.as_wire().to_string(),
                            symbol: p.symbol.clone(),
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// Parse the wire board format. Piece kinds are resolved against the
    /// variant because checkers and chess share the name "king".
    pub fn from_wire(wire: &WireBoard, variant: Variant) -> Result<Self, SessionError> {
        if wire.len() != N || wire.iter().any(|row| row.len() != N) {
            return Err(SessionError::Protocol(format!(
                "board must be {N}x{N}, got {} rows",
                wire.len()
            )));
        }

        let mut board = Board::empty();
        for (row, cells) in wire.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let Some(wp) = cell else { continue };
                let side = Side::from_wire(&wp.color)
                    .ok_or_else(|| SessionError::Protocol(format!("unknown color: {}", wp.color)))?;
                let kind = PieceKind::from_wire(&wp.kind, variant).ok_or_else(|| {
                    SessionError::Protocol(format!("unknown {variant} piece: {}", wp.kind))
                })?;
                board.cells[row][col] = Some(Piece::new(side, kind, wp.symbol.clone()));
            }
        }
        Ok(board)
    }

    /// Human-readable board: rank numbers on the left, files along the bottom.
    pub fn board_string(&self) -> String {
        let mut s = String::new();
        for row in 0..N {
            s.push_str(&format!("{} ", N - row));
            for col in 0..N {
                match &self.cells[row][col] {
                    Some(p) => s.push_str(&p.symbol),
                    None if (row + col) % 2 == 0 => s.push('·'),
                    None => s.push(' '),
                }
                s.push(' ');
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h\n");
        s
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
