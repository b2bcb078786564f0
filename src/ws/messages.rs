//! Wire messages exchanged with the authoritative peer.
//!
//! Every frame is a JSON object whose `"type"` field names the message.

use serde::{Deserialize, Deserializer, Serialize};

use crate::engine::board::WireBoard;
use crate::engine::types::{Side, Square, Variant};

/// `[row, col]` as carried on the wire.
pub type WirePos = [i32; 2];

// ---------------------------------------------------------------------------
// Client → Server commands
// ---------------------------------------------------------------------------

/// Commands a session sends to the authoritative peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientCommand {
    JoinGame {
        game_id: String,
        game_type: Variant,
        #[serde(deserialize_with = "id_string")]
        player_id: String,
    },
    GetValidMoves {
        game_id: String,
        position: WirePos,
    },
    MakeMove {
        game_id: String,
        from_pos: WirePos,
        to_pos: WirePos,
        #[serde(deserialize_with = "id_string")]
        player_id: String,
    },
}

// ---------------------------------------------------------------------------
// Server → Client events
// ---------------------------------------------------------------------------

/// Events the authoritative peer sends to sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    GameJoined {
        game_id: String,
        color: Side,
        game_type: Variant,
        board: WireBoard,
        status: String,
    },
    ValidMoves {
        moves: Vec<WirePos>,
    },
    MoveMade {
        board: WireBoard,
        status: String,
        from_pos: WirePos,
        to_pos: WirePos,
        game_over: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        winner: Option<Side>,
    },
    PlayerJoined {
        #[serde(deserialize_with = "id_string")]
        player_id: String,
        color: Side,
    },
    Error {
        message: String,
    },
    OpponentDisconnected,
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

impl ClientCommand {
    pub fn join_game(game_id: &str, variant: Variant, player_id: &str) -> Self {
        ClientCommand::JoinGame {
            game_id: game_id.to_string(),
            game_type: variant,
            player_id: player_id.to_string(),
        }
    }

    pub fn get_valid_moves(game_id: &str, position: Square) -> Self {
        ClientCommand::GetValidMoves {
            game_id: game_id.to_string(),
            position: position.to_pair(),
        }
    }

    pub fn make_move(game_id: &str, from: Square, to: Square, player_id: &str) -> Self {
        ClientCommand::MakeMove {
            game_id: game_id.to_string(),
            from_pos: from.to_pair(),
            to_pos: to.to_pair(),
            player_id: player_id.to_string(),
        }
    }

    /// Message tag, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            ClientCommand::JoinGame { .. } => "join_game",
            ClientCommand::GetValidMoves { .. } => "get_valid_moves",
            ClientCommand::MakeMove { .. } => "make_move",
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","message":"serialization failed"}"#.to_string())
    }
}

impl ServerEvent {
    pub fn error(message: &str) -> Self {
        ServerEvent::Error {
            message: message.to_string(),
        }
    }

    pub fn valid_moves(moves: &[Square]) -> Self {
        ServerEvent::ValidMoves {
            moves: moves.iter().map(|s| s.to_pair()).collect(),
        }
    }

    /// Message tag, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            ServerEvent::GameJoined { .. } => "game_joined",
            ServerEvent::ValidMoves { .. } => "valid_moves",
            ServerEvent::MoveMade { .. } => "move_made",
            ServerEvent::PlayerJoined { .. } => "player_joined",
            ServerEvent::Error { .. } => "error",
            ServerEvent::OpponentDisconnected => "opponent_disconnected",
        }
    }

    /// Serialize to JSON text for sending over WebSocket.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"error","message":"serialization failed"}"#.to_string())
    }
}

/// Player ids arrive as strings or as numbers (platform user ids).
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Str(String),
        Num(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Str(s) => s,
        Id::Num(n) => n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
