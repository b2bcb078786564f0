pub mod opponent;

pub use opponent::{Opponent, RandomOpponent};
