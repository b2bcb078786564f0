//! Local opponent: trait definition and RandomOpponent.
//!
//! The `Opponent` trait is what the session calls when the bot side is to
//! move in `vsBot` mode. `RandomOpponent` plays a uniformly random legal
//! move under whatever oracle the session is using.

use std::sync::Mutex;

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::engine::board::Board;
use crate::engine::oracle::{MoveOracle, all_moves};
use crate::engine::types::{Move, Side};

// =========================================================================
// Opponent trait
// =========================================================================

/// A computer player for the side the human does not control.
pub trait Opponent: Send + Sync {
    /// Pick a move for `side`, or `None` when it has no legal move.
    fn choose(&self, board: &Board, side: Side, oracle: &dyn MoveOracle) -> Option<Move>;

    /// Human-readable name for this opponent.
    fn name(&self) -> &str;
}

// =========================================================================
// RandomOpponent
// =========================================================================

/// Picks uniformly among all legal (piece, destination) pairs.
#[derive(Debug, Default)]
pub struct RandomOpponent {
    /// Seeded generator for reproducible games; thread RNG when absent.
    rng: Option<Mutex<StdRng>>,
}

impl RandomOpponent {
    pub fn new() -> Self {
        Self { rng: None }
    }

    /// Deterministic opponent: the same seed replays the same choices.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }
}

impl Opponent for RandomOpponent {
    fn choose(&self, board: &Board, side: Side, oracle: &dyn MoveOracle) -> Option<Move> {
        let moves = all_moves(oracle, board, side);
        if moves.is_empty() {
            return None;
        }
        match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().ok()?;
                moves.choose(&mut *rng).cloned()
            }
            None => moves.choose(&mut rand::thread_rng()).cloned(),
        }
    }

    fn name(&self) -> &str {
        "RandomOpponent"
    }
}

// =========================================================================
// Tests
// =========================================================================
