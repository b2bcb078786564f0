//! Authoritative per-game state held by the server.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::engine::board::{Board, SymbolTable};
use crate::engine::history::MoveHistory;
use crate::engine::oracle::{LocalOracle, MoveOracle, Verdict};
use crate::engine::rules::{self, Outcome};
use crate::engine::types::{Side, Square, Variant};
use crate::ws::messages::ServerEvent;

/// Reasons a room refuses a request. The display text is what clients
/// receive in `error` frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Game ID required")]
    MissingGameId,
    #[error("Game not found")]
    NotFound,
    #[error("Game is full")]
    Full,
    #[error("Not your turn")]
    NotYourTurn,
    #[error("Invalid move")]
    InvalidMove,
    #[error("Game is over")]
    Finished,
    #[error("Not seated in this game")]
    NotSeated,
}

/// A game hosted by the server: board, history and seated players.
#[derive(Debug)]
pub struct Room {
    id: String,
    variant: Variant,
    board: Board,
    history: MoveHistory,
    /// Seated players in join order.
    players: Vec<(String, Side)>,
    oracle: LocalOracle,
    outcome: Option<Outcome>,
    created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(id: &str, variant: Variant) -> Self {
        Self {
            id: id.to_string(),
            variant,
            board: Board::initial_layout(variant, &SymbolTable::for_variant(variant)),
            history: MoveHistory::new(),
            players: Vec::new(),
            oracle: LocalOracle::new(variant),
            outcome: None,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn color_of(&self, player_id: &str) -> Option<Side> {
        self.players
            .iter()
            .find(|(id, _)| id == player_id)
            .map(|&(_, side)| side)
    }

    pub fn status(&self) -> String {
        rules::status_text(self.history.side_to_move(), self.outcome.as_ref())
    }

    /// Seat a player. The first gets white, the second black; a player
    /// already seated keeps their color.
    pub fn join(&mut self, player_id: &str) -> Result<Side, RoomError> {
        if let Some(side) = self.color_of(player_id) {
            return Ok(side);
        }
        let side = match self.players.len() {
            0 => Side::White,
            1 => Side::Black,
            _ => return Err(RoomError::Full),
        };
        self.players.push((player_id.to_string(), side));
        Ok(side)
    }

    /// Destinations of the piece on `from`, whichever side it belongs to.
    pub fn valid_moves(&self, from: Square) -> Vec<Square> {
        if self.outcome.is_some() {
            return Vec::new();
        }
        self.board
            .piece_at(from)
            .and_then(|p| self.oracle.legal_destinations(&self.board, from, p.side))
            .unwrap_or_default()
    }

    /// Validate and apply a move. On success returns the `move_made`
    /// event to broadcast.
    pub fn make_move(&mut self, player_id: &str, from: Square, to: Square) -> Result<ServerEvent, RoomError> {
        if self.outcome.is_some() {
            return Err(RoomError::Finished);
        }
        let mover = self.history.side_to_move();
        if self.color_of(player_id) != Some(mover) {
            return Err(RoomError::NotYourTurn);
        }

        let mv = match self.oracle.check(&self.board, from, to, mover) {
            Verdict::Legal(mv) => mv,
            Verdict::Illegal | Verdict::Deferred => return Err(RoomError::InvalidMove),
        };
        self.board.apply(&mv).map_err(|_| RoomError::InvalidMove)?;
        self.history.push(mv.clone());
        self.outcome = rules::outcome_after(&self.oracle, &self.board, &mv, mover);

        Ok(ServerEvent::MoveMade {
            board: self.board.to_wire(),
            status: self.status(),
            from_pos: from.to_pair(),
            to_pos: to.to_pair(),
            game_over: self.outcome.is_some(),
            winner: self.outcome.and_then(|o| o.winner),
        })
    }

    /// `game_joined` for a seated player.
    pub fn joined_event(&self, color: Side) -> ServerEvent {
        ServerEvent::GameJoined {
            game_id: self.id.clone(),
            color,
            game_type: self.variant,
            board: self.board.to_wire(),
            status: self.status(),
        }
    }

    pub fn is_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.created_at);
        age.to_std().is_ok_and(|age| age > max_age)
    }
}
