use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// The two sides of a session. White is the first side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// Side to move after `plies` half-moves have been played.
    #[inline]
    pub const fn from_parity(plies: usize) -> Self {
        if plies % 2 == 0 { Side::White } else { Side::Black }
    }

    /// Row direction of forward movement: white moves towards row 0.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Side::White => -1,
            Side::Black => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::White => "white",
            Side::Black => "black",
        }
    }

    /// Parse a wire color name.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "white" => Some(Side::White),
            "black" => Some(Side::Black),
            _ => None,
        }
    }
}

impl std::ops::Not for Side {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Variant
// ---------------------------------------------------------------------------

/// Which game a session plays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    #[default]
    Chess,
    Checkers,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Chess => "chess",
            Variant::Checkers => "checkers",
        }
    }

    /// Parse from string (case-insensitive). Unknown names yield `None`.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "chess" => Some(Variant::Chess),
            "checkers" | "draughts" => Some(Variant::Checkers),
            _ => None,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PieceKind
// ---------------------------------------------------------------------------

/// Piece kinds of both variants. `Man` and `Crowned` are checkers pieces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
    Man,
    Crowned,
}

impl PieceKind {
    /// Wire name. A crowned checker is called "king" on the wire.
    pub fn as_wire(self) -> &'static str {
        match self {
            PieceKind::Pawn => "pawn",
            PieceKind::Knight => "knight",
            PieceKind::Bishop => "bishop",
            PieceKind::Rook => "rook",
            PieceKind::Queen => "queen",
            PieceKind::King | PieceKind::Crowned => "king",
            PieceKind::Man => "man",
        }
    }

    /// Parse a wire name in the context of a variant.
    pub fn from_wire(name: &str, variant: Variant) -> Option<Self> {
        let kind = match (variant, name) {
            (Variant::Chess, "pawn") => PieceKind::Pawn,
            (Variant::Chess, "knight") => PieceKind::Knight,
            (Variant::Chess, "bishop") => PieceKind::Bishop,
            (Variant::Chess, "rook") => PieceKind::Rook,
            (Variant::Chess, "queen") => PieceKind::Queen,
            (Variant::Chess, "king") => PieceKind::King,
            (Variant::Checkers, "man") => PieceKind::Man,
            (Variant::Checkers, "king") => PieceKind::Crowned,
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_wire())
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A piece on the board together with its display symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub side: Side,
    pub kind: PieceKind,
    pub symbol: String,
}

impl Piece {
    pub fn new(side: Side, kind: PieceKind, symbol: impl Into<String>) -> Self {
        Self {
            side,
            kind,
            symbol: symbol.into(),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.side, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// A board square addressed by (row, col). Row 0 is black's back rank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    pub const SIZE: u8 = 8;

    /// Build a square, rejecting coordinates outside the 8×8 board.
    pub fn new(row: i32, col: i32) -> Result<Self, SessionError> {
        if (0..Self::SIZE as i32).contains(&row) && (0..Self::SIZE as i32).contains(&col) {
            Ok(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            Err(SessionError::InvalidSquare { row, col })
        }
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub fn col(self) -> u8 {
        self.col
    }

    /// Square shifted by a (row, col) delta, if it stays on the board.
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        Square::new(
            self.row as i32 + d_row as i32,
            self.col as i32 + d_col as i32,
        )
        .ok()
    }

    /// Dark squares are the playable squares in checkers.
    #[inline]
    pub fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    /// All 64 squares, row-major.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..Self::SIZE).flat_map(|row| (0..Self::SIZE).map(move |col| Square { row, col }))
    }

    /// Algebraic name: files a–h from column 0, ranks 8–1 from row 0.
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.col) as char;
        let rank = (b'8' - self.row) as char;
        format!("{file}{rank}")
    }

    /// Parse algebraic notation like "e2".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if col < 8 && rank < 8 {
            Some(Square { row: 7 - rank, col })
        } else {
            None
        }
    }

    /// `[row, col]` pair as carried on the wire.
    pub fn to_pair(self) -> [i32; 2] {
        [self.row as i32, self.col as i32]
    }

    pub fn from_pair(pair: [i32; 2]) -> Result<Self, SessionError> {
        Square::new(pair[0], pair[1])
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// A fully resolved move. `captured_at` differs from `to` only for a
/// checkers jump, where the captured piece sits between the two squares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub captured_at: Option<Square>,
}

impl Move {
    /// A move with no capture.
    pub fn quiet(from: Square, to: Square, piece: Piece) -> Self {
        Self {
            from,
            to,
            piece,
            captured: None,
            captured_at: None,
        }
    }

    /// A move capturing `captured` standing on `at`.
    pub fn capture(from: Square, to: Square, piece: Piece, captured: Piece, at: Square) -> Self {
        Self {
            from,
            to,
            piece,
            captured: Some(captured),
            captured_at: Some(at),
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Errors and non-fatal signals raised by the session core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("illegal move: {from} -> {to}")]
    IllegalMove { from: Square, to: Square },

    #[error("square out of range: ({row}, {col})")]
    InvalidSquare { row: i32, col: i32 },

    #[error("no piece on {0}")]
    EmptySquare(Square),

    #[error("channel error: {0}")]
    ChannelError(String),

    #[error("opponent disconnected")]
    OpponentLost,

    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SessionError {
    /// Whether the error ends the operation abnormally (as opposed to a
    /// user- or peer-caused signal).
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidSquare { .. }
                | SessionError::EmptySquare(_)
                | SessionError::Protocol(_)
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_toggle() {
        assert_eq!(!Side::White, Side::Black);
        assert_eq!(!Side::Black, Side::White);
    }

    #[test]
    fn side_from_parity() {
        assert_eq!(Side::from_parity(0), Side::White);
        assert_eq!(Side::from_parity(1), Side::Black);
        assert_eq!(Side::from_parity(42), Side::White);
    }

    #[test]
    fn side_wire_names() {
        assert_eq!(Side::White.to_string(), "white");
        assert_eq!(Side::from_wire("black"), Some(Side::Black));
        assert_eq!(Side::from_wire("red"), None);
    }

    #[test]
    fn variant_from_str() {
        assert_eq!(Variant::from_str_loose("CHESS"), Some(Variant::Chess));
        assert_eq!(Variant::from_str_loose("checkers"), Some(Variant::Checkers));
        assert_eq!(Variant::from_str_loose("go"), None);
    }

    #[test]
    fn piece_kind_wire_names_depend_on_variant() {
        assert_eq!(
            PieceKind::from_wire("king", Variant::Chess),
            Some(PieceKind::King)
        );
        assert_eq!(
            PieceKind::from_wire("king", Variant::Checkers),
            Some(PieceKind::Crowned)
        );
        assert_eq!(PieceKind::from_wire("man", Variant::Chess), None);
        assert_eq!(PieceKind::Crowned.as_wire(), "king");
    }

    #[test]
    fn square_bounds() {
        assert!(Square::new(0, 0).is_ok());
        assert!(Square::new(7, 7).is_ok());
        assert_eq!(
            Square::new(8, 0),
            Err(SessionError::InvalidSquare { row: 8, col: 0 })
        );
        assert!(Square::new(0, -1).is_err());
    }

    #[test]
    fn square_algebraic() {
        let e2 = Square::new(6, 4).unwrap();
        assert_eq!(e2.to_algebraic(), "e2");
        assert_eq!(Square::from_algebraic("e2"), Some(e2));
        assert_eq!(Square::from_algebraic("a8"), Square::new(0, 0).ok());
        assert_eq!(Square::from_algebraic("i1"), None);
        assert_eq!(Square::from_algebraic("e"), None);
    }

    #[test]
    fn square_offset_stays_on_board() {
        let a8 = Square::new(0, 0).unwrap();
        assert_eq!(a8.offset(-1, 0), None);
        assert_eq!(a8.offset(1, 1), Square::new(1, 1).ok());
    }

    #[test]
    fn square_all_covers_board() {
        assert_eq!(Square::all().count(), 64);
        assert_eq!(Square::all().filter(|s| s.is_dark()).count(), 32);
    }

    #[test]
    fn move_display() {
        let pawn = Piece::new(Side::White, PieceKind::Pawn, "P");
        let m = Move::quiet(
            Square::new(6, 4).unwrap(),
            Square::new(4, 4).unwrap(),
            pawn,
        );
        assert_eq!(m.to_string(), "e2-e4");
        assert!(!m.is_capture());
    }

    #[test]
    fn error_classification() {
        assert!(SessionError::InvalidSquare { row: 9, col: 0 }.is_fault());
        assert!(!SessionError::OpponentLost.is_fault());
        assert!(!SessionError::ChannelError("down".into()).is_fault());
    }
}
