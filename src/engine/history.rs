//! Append-only move history and its numbered notation.

use chrono::{DateTime, Utc};

use crate::engine::types::{Move, Side};

/// A recorded move in the game history.
#[derive(Clone, Debug)]
pub struct MoveRecord {
    /// The move that was played.
    pub mv: Move,
    /// Who played it.
    pub side: Side,
    pub played_at: DateTime<Utc>,
}

/// Ordered, append-only record of applied moves. Its length's parity
/// decides the side to move: even length means `first` is to move.
#[derive(Clone, Debug)]
pub struct MoveHistory {
    records: Vec<MoveRecord>,
    first: Side,
}

impl Default for MoveHistory {
    fn default() -> Self {
        Self::starting_with(Side::White)
    }
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty history for a position where `first` is to move, e.g. a
    /// game picked up mid-way.
    pub fn starting_with(first: Side) -> Self {
        Self {
            records: Vec::new(),
            first,
        }
    }

    /// Append a move. The mover is implied by the current length.
    pub fn push(&mut self, mv: Move) -> &MoveRecord {
        let side = self.side_to_move();
        self.records.push(MoveRecord {
            mv,
            side,
            played_at: Utc::now(),
        });
        &self.records[self.records.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Side to move next.
    pub fn side_to_move(&self) -> Side {
        match self.first {
            Side::White => Side::from_parity(self.records.len()),
            Side::Black => !Side::from_parity(self.records.len()),
        }
    }

    /// Shift the parity so that `to_move` is next, keeping every record.
    /// Returns whether anything changed.
    pub fn realign(&mut self, to_move: Side) -> bool {
        if self.side_to_move() == to_move {
            return false;
        }
        self.first = !self.first;
        true
    }

    pub fn last(&self) -> Option<&MoveRecord> {
        self.records.last()
    }

    pub fn records(&self) -> &[MoveRecord] {
        &self.records
    }

    /// Numbered move pairs, one line per full move: `1. e2-e4 e7-e5`.
    /// A black move with no white move before it opens its own line
    /// (`1... e7-e5`).
    pub fn notation_lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        let mut open = false;
        for record in &self.records {
            if record.side == Side::Black && open {
                if let Some(line) = lines.last_mut() {
                    line.push(' ');
                    line.push_str(&record.mv.to_string());
                }
                open = false;
                continue;
            }
            let n = lines.len() + 1;
            match record.side {
                Side::White => lines.push(format!("{n}. {}", record.mv)),
                Side::Black => lines.push(format!("{n}... {}", record.mv)),
            }
            open = record.side == Side::White;
        }
        lines
    }
}
