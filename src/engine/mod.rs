pub mod board;
pub mod history;
pub mod oracle;
pub mod rules;
pub mod types;

pub use board::{Board, SymbolTable, WireBoard, WirePiece};
pub use history::{MoveHistory, MoveRecord};
pub use oracle::{LocalOracle, MoveOracle, RemoteOracle, Verdict};
pub use rules::{EndReason, Outcome};
pub use types::*;
