//! Authoritative game server.
//!
//! - [`room`]: per-game board, history and seats.
//! - [`manager`]: per-game connection tracking and broadcast.
//! - [`handler`]: Axum WebSocket upgrade handler.
//! - [`router`]: HTTP routes and middleware.
//! - [`cleanup`]: periodic removal of stale rooms.

pub mod cleanup;
pub mod handler;
pub mod manager;
pub mod room;
pub mod router;
pub mod state;

pub use manager::WsManager;
pub use room::{Room, RoomError};
pub use router::create_router;
pub use state::{ServerState, SharedState};
