//! Two-player chess and checkers sessions kept in sync with an
//! authoritative peer over WebSocket, with local play as a fallback.
//!
//! - [`engine`]: board, moves, legality oracles, end-of-game rules.
//! - [`session`]: the session state machine and its async runtime.
//! - [`ws`]: wire messages and the client channel.
//! - [`ai`]: the local opponent.
//! - [`server`]: the authoritative peer.

pub mod ai;
pub mod config;
pub mod engine;
pub mod server;
pub mod session;
pub mod ws;
