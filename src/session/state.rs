//! The game-session state machine.
//!
//! `Session` owns the board, the move history, selection state and the
//! game phase. It is fed discrete events (clicks, inbound wire messages,
//! timers) one at a time and answers each with a list of `Effect`s for the
//! runtime to carry out. It never blocks and never touches the network.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use crate::ai::{Opponent, RandomOpponent};
use crate::engine::board::{Board, SymbolTable, WireBoard};
use crate::engine::history::MoveHistory;
use crate::engine::oracle::{LocalOracle, MoveOracle, RemoteOracle, Verdict, has_any_move};
use crate::engine::rules::{self, EndReason, Outcome};
use crate::engine::types::{Move, SessionError, Side, Square, Variant};
use crate::ws::messages::{ClientCommand, ServerEvent, WirePos};

use super::platform::Platform;
use super::render::RenderSink;

// =========================================================================
// Phase / Mode
// =========================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingOpponent,
    Active,
    GameOver,
}

/// Who is authoritative for legality.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// The authoritative peer validates and applies every move.
    Remote,
    /// Channel unavailable: both sides are played on this device.
    LocalFallback,
    /// The human plays one side, the local opponent the other.
    VsBot,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Remote => "remote",
            Mode::LocalFallback => "local_fallback",
            Mode::VsBot => "vs_bot",
        }
    }

    fn is_local(self) -> bool {
        !matches!(self, Mode::Remote)
    }
}

// =========================================================================
// Events and effects
// =========================================================================

/// Everything that can drive the session, serialized through one queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    SquareClicked { row: i32, col: i32 },
    Server(ServerEvent),
    /// The channel could not be established.
    ChannelFailed(String),
    /// An established channel went away.
    ChannelClosed,
    BotTurn,
    JoinTimedOut,
    ReplyTimedOut { seq: u64 },
    Resign,
    Exit,
}

/// Work the runtime performs on the session's behalf.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Send(ClientCommand),
    /// Run the bot after the cosmetic delay.
    ScheduleBotMove,
    /// Bound the wait for `game_joined`.
    AwaitJoin,
    /// Bound the wait for the reply to move `seq`.
    AwaitReply { seq: u64 },
    CloseChannel,
}

// =========================================================================
// Session
// =========================================================================

/// Identity of a session.
#[derive(Clone, Debug)]
pub struct SessionInit {
    pub game_id: String,
    pub player_id: String,
    pub variant: Variant,
}

impl SessionInit {
    /// Fresh ids for a game of `variant`.
    pub fn generate(variant: Variant) -> Self {
        Self {
            game_id: uuid::Uuid::new_v4().simple().to_string()[..8].to_string(),
            player_id: uuid::Uuid::new_v4().to_string(),
            variant,
        }
    }
}

/// A remote move waiting for the peer's verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingMove {
    seq: u64,
    from: Square,
    to: Square,
}

pub struct Session {
    // Identity
    id: String,
    player_id: String,
    variant: Variant,
    symbols: SymbolTable,

    // Core state
    local_side: Side,
    mode: Mode,
    phase: Phase,
    board: Board,
    history: MoveHistory,
    selection: Option<Square>,
    destinations: Vec<Square>,
    outcome: Option<Outcome>,
    status: String,
    pending: Option<PendingMove>,
    /// Squares with a `get_valid_moves` still unanswered, oldest first.
    queries: VecDeque<Square>,
    next_seq: u64,
    terminated: bool,

    // Collaborators
    oracle: Box<dyn MoveOracle>,
    opponent: Box<dyn Opponent>,
    render: Box<dyn RenderSink>,
    platform: Box<dyn Platform>,
}

impl Session {
    // -----------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------

    pub fn new(init: SessionInit, render: Box<dyn RenderSink>, platform: Box<dyn Platform>) -> Self {
        let symbols = SymbolTable::for_variant(init.variant);
        Self {
            id: init.game_id,
            player_id: init.player_id,
            variant: init.variant,
            board: Board::initial_layout(init.variant, &symbols),
            symbols,
            local_side: Side::White,
            mode: Mode::Remote,
            phase: Phase::Idle,
            history: MoveHistory::new(),
            selection: None,
            destinations: Vec::new(),
            outcome: None,
            status: String::new(),
            pending: None,
            queries: VecDeque::new(),
            next_seq: 1,
            terminated: false,
            oracle: Box::new(RemoteOracle),
            opponent: Box::new(RandomOpponent::new()),
            render,
            platform,
        }
    }

    /// Replace the local opponent (e.g. with a seeded one).
    pub fn with_opponent(mut self, opponent: Box<dyn Opponent>) -> Self {
        self.opponent = opponent;
        self
    }

    /// Replace the symbol table used for locally built boards.
    pub fn with_symbols(mut self, symbols: SymbolTable) -> Self {
        self.board = Board::initial_layout(self.variant, &symbols);
        self.symbols = symbols;
        self
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    pub fn local_side(&self) -> Side {
        self.local_side
    }

    /// Side to move, derived from history parity.
    pub fn current_turn(&self) -> Side {
        self.history.side_to_move()
    }

    pub fn selection(&self) -> Option<Square> {
        self.selection
    }

    pub fn legal_destinations(&self) -> &[Square] {
        &self.destinations
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn winner(&self) -> Option<Side> {
        self.outcome.and_then(|o| o.winner)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Whether a remote move is waiting for the peer's reply.
    pub fn awaiting_reply(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether the session has been torn down. A terminated session
    /// ignores every further event.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// Whether this device plays `side` in the current mode.
    pub fn controls(&self, side: Side) -> bool {
        match self.mode {
            Mode::LocalFallback => true,
            Mode::Remote | Mode::VsBot => side == self.local_side,
        }
    }

    // -----------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------

    /// Ask the authoritative peer to join the game.
    pub fn join(&mut self) -> Vec<Effect> {
        if self.terminated || self.phase != Phase::Idle {
            warn!(game_id = %self.id, phase = ?self.phase, "join ignored");
            return Vec::new();
        }
        self.phase = Phase::AwaitingOpponent;
        self.mode = Mode::Remote;
        self.oracle = Box::new(RemoteOracle);
        self.set_status("Connecting…".to_string());
        info!(game_id = %self.id, variant = %self.variant, "joining game");
        vec![
            Effect::Send(ClientCommand::join_game(
                &self.id,
                self.variant,
                &self.player_id,
            )),
            Effect::AwaitJoin,
        ]
    }

    /// Start a game with no authoritative peer.
    pub fn start_local(&mut self, mode: Mode, local_side: Side) -> Vec<Effect> {
        if self.terminated || !matches!(self.phase, Phase::Idle | Phase::AwaitingOpponent) {
            warn!(game_id = %self.id, phase = ?self.phase, "local start ignored");
            return Vec::new();
        }
        if !mode.is_local() {
            warn!(game_id = %self.id, "start_local needs a local mode");
            return Vec::new();
        }

        self.mode = mode;
        self.local_side = local_side;
        self.oracle = Box::new(LocalOracle::new(self.variant));
        self.board = Board::initial_layout(self.variant, &self.symbols);
        self.history = MoveHistory::new();
        self.pending = None;
        self.queries.clear();
        self.phase = Phase::Active;
        info!(game_id = %self.id, mode = mode.as_str(), side = %local_side, "local game started");

        self.clear_selection();
        self.render.on_board_changed(&self.board);
        self.platform.expand();
        self.publish_local_status();
        self.bot_followup()
    }

    // -----------------------------------------------------------------
    // Event dispatch
    // -----------------------------------------------------------------

    /// Process one event to completion.
    pub fn handle(&mut self, event: SessionEvent) -> Vec<Effect> {
        if self.terminated {
            debug!(game_id = %self.id, ?event, "event after teardown ignored");
            return Vec::new();
        }

        let result = match event {
            SessionEvent::SquareClicked { row, col } => self.click(row, col),
            SessionEvent::Server(evt) => self.on_server_event(evt),
            SessionEvent::ChannelFailed(reason) => Ok(self.on_channel_lost(reason)),
            SessionEvent::ChannelClosed => {
                Ok(self.on_channel_lost("connection closed".to_string()))
            }
            SessionEvent::BotTurn => self.bot_turn(),
            SessionEvent::JoinTimedOut => Ok(if self.phase == Phase::AwaitingOpponent {
                self.downgrade("no game_joined within the connect window".to_string())
            } else {
                Vec::new()
            }),
            SessionEvent::ReplyTimedOut { seq } => Ok(match self.pending {
                Some(p) if p.seq == seq => self.downgrade(format!("no reply to move {seq}")),
                _ => Vec::new(),
            }),
            SessionEvent::Resign => Ok(self.resign()),
            SessionEvent::Exit => Ok(self.exit()),
        };

        result.unwrap_or_else(|err| {
            self.surface(&err);
            Vec::new()
        })
    }

    // -----------------------------------------------------------------
    // Move protocol
    // -----------------------------------------------------------------

    fn click(&mut self, row: i32, col: i32) -> Result<Vec<Effect>, SessionError> {
        let sq = Square::new(row, col)?;
        if self.phase != Phase::Active || self.pending.is_some() {
            return Ok(Vec::new());
        }

        match self.selection {
            None => self.select(sq),
            Some(selected) if selected == sq => {
                self.clear_selection();
                Ok(Vec::new())
            }
            Some(selected) => self.attempt(selected, sq),
        }
    }

    fn select(&mut self, sq: Square) -> Result<Vec<Effect>, SessionError> {
        let turn = self.current_turn();
        let own = self.board.piece_at(sq).is_some_and(|p| p.side == turn);
        if !own || !self.controls(turn) {
            // Not this player's piece or not their turn.
            return Ok(Vec::new());
        }

        self.selection = Some(sq);
        match self.oracle.legal_destinations(&self.board, sq, turn) {
            Some(dests) => {
                self.destinations = dests;
                self.render.on_selection_changed(self.selection, &self.destinations);
                Ok(Vec::new())
            }
            None => {
                self.destinations.clear();
                self.render.on_selection_changed(self.selection, &self.destinations);
                self.queries.push_back(sq);
                Ok(vec![Effect::Send(ClientCommand::get_valid_moves(&self.id, sq))])
            }
        }
    }

    fn attempt(&mut self, from: Square, to: Square) -> Result<Vec<Effect>, SessionError> {
        let side = self.current_turn();
        match self.oracle.check(&self.board, from, to, side) {
            Verdict::Legal(mv) => self.apply_local(mv),
            Verdict::Illegal => {
                self.clear_selection();
                Err(SessionError::IllegalMove { from, to })
            }
            Verdict::Deferred => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.pending = Some(PendingMove { seq, from, to });
                debug!(game_id = %self.id, seq, %from, %to, "move sent for confirmation");
                Ok(vec![
                    Effect::Send(ClientCommand::make_move(&self.id, from, to, &self.player_id)),
                    Effect::AwaitReply { seq },
                ])
            }
        }
    }

    /// Apply a move the local oracle accepted.
    fn apply_local(&mut self, mv: Move) -> Result<Vec<Effect>, SessionError> {
        let mover = self.current_turn();
        self.board.apply(&mv)?;
        debug!(game_id = %self.id, side = %mover, mv = %mv, "move applied");
        self.history.push(mv.clone());
        self.clear_selection();
        self.render.on_board_changed(&self.board);

        if let Some(outcome) = rules::outcome_after(self.oracle.as_ref(), &self.board, &mv, mover) {
            self.finish(outcome);
            return Ok(Vec::new());
        }
        self.publish_local_status();
        Ok(self.bot_followup())
    }

    fn bot_followup(&self) -> Vec<Effect> {
        if self.phase == Phase::Active
            && self.mode == Mode::VsBot
            && !self.controls(self.current_turn())
        {
            vec![Effect::ScheduleBotMove]
        } else {
            Vec::new()
        }
    }

    fn bot_turn(&mut self) -> Result<Vec<Effect>, SessionError> {
        let side = self.current_turn();
        if self.phase != Phase::Active || self.mode != Mode::VsBot || self.controls(side) {
            debug!(game_id = %self.id, "stale bot turn ignored");
            return Ok(Vec::new());
        }

        match self.opponent.choose(&self.board, side, self.oracle.as_ref()) {
            Some(mv) => {
                debug!(game_id = %self.id, opponent = self.opponent.name(), mv = %mv, "bot move");
                self.apply_local(mv)
            }
            None => {
                // Normally caught by game-over detection after the human move.
                if !has_any_move(self.oracle.as_ref(), &self.board, side) {
                    self.finish(Outcome::new(Some(!side), EndReason::NoLegalMoves));
                } else {
                    warn!(game_id = %self.id, "bot produced no move; turn skipped");
                }
                Ok(Vec::new())
            }
        }
    }

    // -----------------------------------------------------------------
    // Inbound wire events
    // -----------------------------------------------------------------

    fn on_server_event(&mut self, evt: ServerEvent) -> Result<Vec<Effect>, SessionError> {
        debug!(game_id = %self.id, tag = evt.tag(), "inbound");
        match evt {
            ServerEvent::GameJoined {
                game_id,
                color,
                game_type,
                board,
                status,
            } => Ok(self.on_game_joined(game_id, color, game_type, &board, status)),
            ServerEvent::ValidMoves { moves } => {
                self.on_valid_moves(&moves);
                Ok(Vec::new())
            }
            ServerEvent::MoveMade {
                board,
                status,
                from_pos,
                to_pos,
                game_over,
                winner,
            } => self.on_move_made(&board, status, from_pos, to_pos, game_over, winner),
            ServerEvent::PlayerJoined { player_id, color } => {
                info!(game_id = %self.id, player_id, %color, "player joined");
                Ok(Vec::new())
            }
            ServerEvent::Error { message } => self.on_peer_error(message),
            ServerEvent::OpponentDisconnected => Ok(self.on_opponent_lost()),
        }
    }

    fn on_game_joined(
        &mut self,
        game_id: String,
        color: Side,
        variant: Variant,
        wire: &WireBoard,
        status: String,
    ) -> Vec<Effect> {
        let accepts = match self.phase {
            Phase::AwaitingOpponent => true,
            Phase::Active => self.mode == Mode::Remote,
            Phase::Idle | Phase::GameOver => false,
        };
        if !accepts {
            debug!(game_id = %self.id, "unexpected game_joined ignored");
            return Vec::new();
        }

        let board = match Board::from_wire(wire, variant) {
            Ok(b) => b,
            Err(err) => {
                warn!(game_id = %self.id, %err, "unreadable game_joined");
                return self.downgrade(err.to_string());
            }
        };

        self.id = game_id;
        self.variant = variant;
        self.symbols = SymbolTable::for_variant(variant);
        self.local_side = color;
        self.mode = Mode::Remote;
        self.oracle = Box::new(RemoteOracle);
        self.board = board;
        // The game may already be under way; the peer's status names the
        // side to move.
        let to_move = rules::turn_in_status(&status).unwrap_or(Side::White);
        self.history = MoveHistory::starting_with(to_move);
        self.pending = None;
        self.queries.clear();
        self.phase = Phase::Active;
        info!(game_id = %self.id, side = %color, %variant, turn = %to_move, "game joined");

        self.clear_selection();
        self.render.on_board_changed(&self.board);
        self.platform.expand();
        self.set_status(status);
        Vec::new()
    }

    fn on_valid_moves(&mut self, moves: &[WirePos]) {
        // Replies come back in query order.
        let Some(asked) = self.queries.pop_front() else {
            debug!(game_id = %self.id, "unsolicited valid_moves dropped");
            return;
        };
        if self.mode != Mode::Remote || self.phase != Phase::Active || self.pending.is_some() {
            return;
        }
        if self.selection != Some(asked) {
            debug!(game_id = %self.id, square = %asked, "valid_moves for a stale selection dropped");
            return;
        }
        self.destinations = moves
            .iter()
            .filter_map(|&p| match Square::from_pair(p) {
                Ok(sq) => Some(sq),
                Err(err) => {
                    warn!(game_id = %self.id, %err, "bad destination dropped");
                    None
                }
            })
            .collect();
        self.render.on_selection_changed(self.selection, &self.destinations);
    }

    fn on_move_made(
        &mut self,
        wire: &WireBoard,
        status: String,
        from_pos: WirePos,
        to_pos: WirePos,
        game_over: bool,
        winner: Option<Side>,
    ) -> Result<Vec<Effect>, SessionError> {
        if self.mode != Mode::Remote || self.phase != Phase::Active {
            debug!(game_id = %self.id, "move_made outside a remote game ignored");
            return Ok(Vec::new());
        }

        let new_board = Board::from_wire(wire, self.variant)?;
        let from = Square::from_pair(from_pos)?;
        let to = Square::from_pair(to_pos)?;

        let mv = reconstruct_move(&self.board, &new_board, from, to, self.variant);
        if let Some(mv) = &mv {
            let mut expected = self.board.clone();
            if expected.apply(mv).is_err() || expected != new_board {
                debug!(game_id = %self.id, "local board diverged; replaced by authoritative board");
            }
        }

        // The peer's board always wins.
        let mover = self.current_turn();
        self.board = new_board;
        match mv {
            Some(mv) => {
                self.history.push(mv);
            }
            None => warn!(game_id = %self.id, %from, %to, "move_made without a piece to record"),
        }
        let next = rules::turn_in_status(&status).unwrap_or(!mover);
        if self.history.realign(next) {
            debug!(game_id = %self.id, turn = %next, "turn realigned to peer");
        }
        self.pending = None;
        self.clear_selection();
        self.render.on_board_changed(&self.board);
        self.set_status(status);

        if game_over {
            self.finish(Outcome::new(winner, EndReason::Reported));
        }
        Ok(Vec::new())
    }

    fn on_peer_error(&mut self, message: String) -> Result<Vec<Effect>, SessionError> {
        match self.phase {
            Phase::AwaitingOpponent => Ok(self.downgrade(message)),
            Phase::Active if self.mode == Mode::Remote => {
                self.clear_selection();
                match self.pending.take() {
                    Some(p) => {
                        debug!(game_id = %self.id, seq = p.seq, message, "move rejected by peer");
                        Err(SessionError::IllegalMove {
                            from: p.from,
                            to: p.to,
                        })
                    }
                    None => {
                        // Answers the oldest destination query, if any.
                        self.queries.pop_front();
                        Err(SessionError::Protocol(message))
                    }
                }
            }
            _ => {
                debug!(game_id = %self.id, message, "peer error ignored");
                Ok(Vec::new())
            }
        }
    }

    fn on_opponent_lost(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Active || self.mode != Mode::Remote {
            return Vec::new();
        }
        self.surface(&SessionError::OpponentLost);
        self.finish(Outcome::new(None, EndReason::OpponentLost));
        vec![Effect::CloseChannel]
    }

    // -----------------------------------------------------------------
    // Channel loss, resignation, exit
    // -----------------------------------------------------------------

    fn on_channel_lost(&mut self, reason: String) -> Vec<Effect> {
        let remote_game = self.phase == Phase::Active && self.mode == Mode::Remote;
        if self.phase == Phase::AwaitingOpponent || remote_game {
            self.downgrade(reason)
        } else {
            debug!(game_id = %self.id, reason, "channel loss ignored");
            Vec::new()
        }
    }

    /// Fall back to local play instead of leaving the session unusable.
    /// Board and history survive when a game is already running.
    fn downgrade(&mut self, reason: String) -> Vec<Effect> {
        info!(game_id = %self.id, reason, "channel unavailable; switching to local play");
        let err = SessionError::ChannelError(reason);
        let mut effects = vec![Effect::CloseChannel];

        match self.phase {
            Phase::AwaitingOpponent => {
                effects.extend(self.start_local(Mode::LocalFallback, self.local_side));
            }
            Phase::Active => {
                self.mode = Mode::LocalFallback;
                self.oracle = Box::new(LocalOracle::new(self.variant));
                self.pending = None;
                self.queries.clear();
                self.clear_selection();
                self.publish_local_status();
            }
            Phase::Idle | Phase::GameOver => {}
        }
        self.surface(&err);
        effects
    }

    fn resign(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Active {
            return Vec::new();
        }
        let resigning = match self.mode {
            Mode::LocalFallback => self.current_turn(),
            Mode::Remote | Mode::VsBot => self.local_side,
        };
        info!(game_id = %self.id, side = %resigning, "resigned");
        self.finish(Outcome::new(Some(!resigning), EndReason::Resigned));
        if self.mode == Mode::Remote {
            vec![Effect::CloseChannel]
        } else {
            Vec::new()
        }
    }

    fn exit(&mut self) -> Vec<Effect> {
        info!(game_id = %self.id, "session closed");
        self.phase = Phase::Idle;
        self.terminated = true;
        self.pending = None;
        self.clear_selection();
        self.platform.close_session();
        vec![Effect::CloseChannel]
    }

    // -----------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------

    /// Enter `GameOver`. Happens at most once per session.
    fn finish(&mut self, outcome: Outcome) {
        if self.phase == Phase::GameOver {
            return;
        }
        self.phase = Phase::GameOver;
        self.outcome = Some(outcome);
        self.pending = None;
        self.clear_selection();
        info!(
            game_id = %self.id,
            winner = ?outcome.winner,
            reason = outcome.reason.as_str(),
            "game over"
        );

        if outcome.reason != EndReason::Reported {
            self.set_status(outcome.to_string());
        }
        if outcome.reason != EndReason::OpponentLost {
            self.render.on_game_over(outcome.winner);
            self.platform.notify(&outcome.to_string());
        }
    }

    fn clear_selection(&mut self) {
        let had = self.selection.is_some() || !self.destinations.is_empty();
        self.selection = None;
        self.destinations.clear();
        if had {
            self.render.on_selection_changed(None, &[]);
        }
    }

    fn set_status(&mut self, status: String) {
        self.render.on_status_changed(&status);
        self.status = status;
    }

    fn publish_local_status(&mut self) {
        let text = rules::status_text(self.current_turn(), self.outcome.as_ref());
        self.set_status(text);
    }

    /// Report a non-fatal signal to the UI and the log.
    fn surface(&mut self, err: &SessionError) {
        if err.is_fault() {
            warn!(game_id = %self.id, %err, "session fault");
        } else if let SessionError::IllegalMove { .. } = err {
            debug!(game_id = %self.id, %err, "illegal move");
        } else {
            info!(game_id = %self.id, %err, "session signal");
            self.platform.notify(&err.to_string());
        }
        self.render.on_notice(err);
    }
}

/// Rebuild the move the peer applied from the boards before and after it.
fn reconstruct_move(before: &Board, after: &Board, from: Square, to: Square, variant: Variant) -> Option<Move> {
    let piece = after
        .piece_at(to)
        .or_else(|| before.piece_at(from))
        .cloned()?;

    if let Some(victim) = before.piece_at(to).filter(|p| p.side != piece.side) {
        return Some(Move::capture(from, to, piece, victim.clone(), to));
    }

    let d_row = to.row() as i8 - from.row() as i8;
    let d_col = to.col() as i8 - from.col() as i8;
    if variant == Variant::Checkers && d_row.abs() == 2 && d_col.abs() == 2 {
        let mid = from.offset(d_row / 2, d_col / 2)?;
        if let Some(victim) = before.piece_at(mid).filter(|p| p.side != piece.side) {
            return Some(Move::capture(from, to, piece, victim.clone(), mid));
        }
    }
    Some(Move::quiet(from, to, piece))
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{Piece, PieceKind};
    use crate::server::room::Room;
    use crate::session::platform::NoopPlatform;
    use crate::session::render::{RecordingSink, RenderCall};

    fn sq(row: i32, col: i32) -> Square {
        Square::new(row, col).unwrap()
    }

    fn session(variant: Variant) -> (Session, RecordingSink) {
        let log = RecordingSink::new();
        let init = SessionInit {
            game_id: "g1".into(),
            player_id: "p1".into(),
            variant,
        };
        let s = Session::new(init, Box::new(log.clone()), Box::new(NoopPlatform))
            .with_opponent(Box::new(RandomOpponent::seeded(11)));
        (s, log)
    }

    fn click(s: &mut Session, row: i32, col: i32) -> Vec<Effect> {
        s.handle(SessionEvent::SquareClicked { row, col })
    }

    fn joined(s: &mut Session, color: Side) {
        let board = Board::initial_layout(Variant::Chess, &SymbolTable::chess());
        s.handle(SessionEvent::Server(ServerEvent::GameJoined {
            game_id: "g1".into(),
            color,
            game_type: Variant::Chess,
            board: board.to_wire(),
            status: "White to move".into(),
        }));
    }

    // --- lifecycle ---

    #[test]
    fn new_session_is_idle() {
        let (s, _) = session(Variant::Chess);
        assert_eq!(s.phase(), Phase::Idle);
        assert_eq!(s.current_turn(), Side::White);
        assert!(s.selection().is_none());
    }

    #[test]
    fn join_sends_join_game_and_awaits() {
        let (mut s, _) = session(Variant::Chess);
        let effects = s.join();
        assert_eq!(s.phase(), Phase::AwaitingOpponent);
        assert_eq!(
            effects,
            vec![
                Effect::Send(ClientCommand::join_game("g1", Variant::Chess, "p1")),
                Effect::AwaitJoin,
            ]
        );
        // A second join is ignored.
        assert!(s.join().is_empty());
    }

    #[test]
    fn start_local_is_immediately_active() {
        let (mut s, log) = session(Variant::Checkers);
        let effects = s.start_local(Mode::LocalFallback, Side::White);
        assert!(effects.is_empty());
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.mode(), Mode::LocalFallback);
        assert_eq!(s.board().count(), 24);
        assert_eq!(log.last_status().as_deref(), Some("White to move"));
    }

    #[test]
    fn start_local_rejects_remote_mode() {
        let (mut s, _) = session(Variant::Chess);
        assert!(s.start_local(Mode::Remote, Side::White).is_empty());
        assert_eq!(s.phase(), Phase::Idle);
    }

    #[test]
    fn bot_moves_first_when_human_plays_black() {
        let (mut s, _) = session(Variant::Chess);
        let effects = s.start_local(Mode::VsBot, Side::Black);
        assert_eq!(effects, vec![Effect::ScheduleBotMove]);
        s.handle(SessionEvent::BotTurn);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.current_turn(), Side::Black);
    }

    // --- selection ---

    #[test]
    fn local_pawn_push_flips_turn() {
        let (mut s, log) = session(Variant::Chess);
        s.start_local(Mode::LocalFallback, Side::White);

        assert!(click(&mut s, 6, 4).is_empty());
        assert_eq!(s.selection(), Some(sq(6, 4)));
        assert!(s.legal_destinations().contains(&sq(4, 4)));
        assert!(s.legal_destinations().contains(&sq(5, 4)));

        click(&mut s, 4, 4);
        assert_eq!(s.current_turn(), Side::Black);
        assert_eq!(s.history().len(), 1);
        assert!(s.board().piece_at(sq(6, 4)).is_none());
        assert_eq!(s.board().piece_at(sq(4, 4)).unwrap().kind, PieceKind::Pawn);
        assert!(s.selection().is_none());
        assert!(s.legal_destinations().is_empty());
        assert!(log.calls().contains(&RenderCall::Selection(None, vec![])));
    }

    #[test]
    fn selecting_opponent_piece_is_ignored() {
        let (mut s, log) = session(Variant::Chess);
        s.start_local(Mode::VsBot, Side::White);
        let before = log.calls().len();
        click(&mut s, 1, 4);
        assert!(s.selection().is_none());
        assert_eq!(log.calls().len(), before);
    }

    #[test]
    fn selecting_empty_square_is_ignored() {
        let (mut s, _) = session(Variant::Chess);
        s.start_local(Mode::LocalFallback, Side::White);
        click(&mut s, 4, 4);
        assert!(s.selection().is_none());
    }

    #[test]
    fn reselecting_clears_selection() {
        let (mut s, _) = session(Variant::Chess);
        s.start_local(Mode::LocalFallback, Side::White);
        click(&mut s, 6, 4);
        click(&mut s, 6, 4);
        assert!(s.selection().is_none());
        assert!(s.legal_destinations().is_empty());
        assert!(s.history().is_empty());
    }

    #[test]
    fn out_of_range_click_surfaces_invalid_square() {
        let (mut s, log) = session(Variant::Chess);
        s.start_local(Mode::LocalFallback, Side::White);
        click(&mut s, 8, 0);
        assert_eq!(
            log.notices(),
            vec![SessionError::InvalidSquare { row: 8, col: 0 }]
        );
    }

    // --- illegal moves ---

    #[test]
    fn illegal_move_changes_nothing() {
        let (mut s, log) = session(Variant::Chess);
        s.start_local(Mode::LocalFallback, Side::White);
        let board = s.board().clone();

        click(&mut s, 6, 4);
        click(&mut s, 3, 4);

        assert_eq!(s.board(), &board);
        assert!(s.history().is_empty());
        assert_eq!(s.current_turn(), Side::White);
        assert!(s.selection().is_none());
        assert_eq!(
            log.notices(),
            vec![SessionError::IllegalMove {
                from: sq(6, 4),
                to: sq(3, 4)
            }]
        );
    }

    #[test]
    fn clicking_own_piece_while_selected_is_a_move_attempt() {
        let (mut s, log) = session(Variant::Chess);
        s.start_local(Mode::LocalFallback, Side::White);
        click(&mut s, 6, 4);
        click(&mut s, 6, 3);
        assert!(s.selection().is_none());
        assert_eq!(log.notices().len(), 1);
    }

    // --- vs bot ---

    #[test]
    fn human_move_schedules_exactly_one_bot_move() {
        let (mut s, _) = session(Variant::Chess);
        s.start_local(Mode::VsBot, Side::White);
        click(&mut s, 6, 4);
        let effects = click(&mut s, 4, 4);
        assert_eq!(effects, vec![Effect::ScheduleBotMove]);

        // Human cannot move while the bot is to move.
        click(&mut s, 6, 3);
        assert!(s.selection().is_none());

        assert!(s.handle(SessionEvent::BotTurn).is_empty());
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.current_turn(), Side::White);

        // A duplicate timer does nothing.
        s.handle(SessionEvent::BotTurn);
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn capturing_last_piece_ends_vs_bot_game() {
        let (mut s, log) = session(Variant::Checkers);
        s.start_local(Mode::VsBot, Side::White);
        // White man about to take the last black man.
        let mut board = Board::empty();
        board.set(sq(5, 2), Some(Piece::new(Side::White, PieceKind::Man, "w")));
        board.set(sq(4, 3), Some(Piece::new(Side::Black, PieceKind::Man, "b")));
        s.board = board;

        click(&mut s, 5, 2);
        let effects = click(&mut s, 3, 4);
        assert!(effects.is_empty(), "no bot move may be scheduled");
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.winner(), Some(Side::White));
        assert_eq!(log.game_over(), Some(Some(Side::White)));

        // A stray bot timer leaves the finished game untouched.
        s.handle(SessionEvent::BotTurn);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn king_capture_finishes_local_game() {
        let (mut s, _) = session(Variant::Chess);
        s.start_local(Mode::LocalFallback, Side::White);
        // Queens roam freely under the rule-light oracle.
        click(&mut s, 7, 3);
        click(&mut s, 0, 4);
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.outcome().unwrap().reason, EndReason::KingCaptured);

        click(&mut s, 1, 0);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn parity_matches_turn_over_many_local_moves() {
        let (mut s, _) = session(Variant::Checkers);
        s.start_local(Mode::LocalFallback, Side::White);
        let oracle = LocalOracle::new(Variant::Checkers);
        let bot = RandomOpponent::seeded(3);
        for _ in 0..40 {
            if s.phase() != Phase::Active {
                break;
            }
            let side = s.current_turn();
            let Some(mv) = bot.choose(s.board(), side, &oracle) else { break };
            click(&mut s, mv.from.row() as i32, mv.from.col() as i32);
            click(&mut s, mv.to.row() as i32, mv.to.col() as i32);
            assert_eq!(s.current_turn(), Side::from_parity(s.history().len()));
        }
        assert!(!s.history().is_empty());
    }

    // --- remote ---

    #[test]
    fn game_joined_activates_remote_session() {
        let (mut s, log) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::Black);
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.mode(), Mode::Remote);
        assert_eq!(s.local_side(), Side::Black);
        assert_eq!(log.last_status().as_deref(), Some("White to move"));
    }

    #[test]
    fn remote_selection_asks_peer_for_destinations() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);

        let effects = click(&mut s, 6, 4);
        assert_eq!(
            effects,
            vec![Effect::Send(ClientCommand::get_valid_moves("g1", sq(6, 4)))]
        );
        s.handle(SessionEvent::Server(ServerEvent::ValidMoves {
            moves: vec![[5, 4], [4, 4]],
        }));
        assert_eq!(s.legal_destinations(), &[sq(5, 4), sq(4, 4)]);
    }

    #[test]
    fn stale_valid_moves_are_dropped() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);
        s.handle(SessionEvent::Server(ServerEvent::ValidMoves {
            moves: vec![[5, 4]],
        }));
        assert!(s.legal_destinations().is_empty());
    }

    #[test]
    fn remote_move_waits_for_confirmation() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);
        let before = s.board().clone();

        click(&mut s, 6, 4);
        let effects = click(&mut s, 4, 4);
        assert_eq!(
            effects,
            vec![
                Effect::Send(ClientCommand::make_move("g1", sq(6, 4), sq(4, 4), "p1")),
                Effect::AwaitReply { seq: 1 },
            ]
        );
        assert_eq!(s.board(), &before);
        assert!(s.history().is_empty());
        assert!(s.awaiting_reply());

        let mut after = before.clone();
        let pawn = after.piece_at(sq(6, 4)).cloned().unwrap();
        after.apply(&Move::quiet(sq(6, 4), sq(4, 4), pawn)).unwrap();
        s.handle(SessionEvent::Server(ServerEvent::MoveMade {
            board: after.to_wire(),
            status: "Black to move".into(),
            from_pos: [6, 4],
            to_pos: [4, 4],
            game_over: false,
            winner: None,
        }));
        assert_eq!(s.board(), &after);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.current_turn(), Side::Black);
        assert!(!s.awaiting_reply());
        assert_eq!(s.status(), "Black to move");
    }

    #[test]
    fn valid_moves_for_an_earlier_selection_are_dropped() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);

        click(&mut s, 6, 4);
        click(&mut s, 6, 4);
        click(&mut s, 6, 3);
        assert_eq!(s.selection(), Some(sq(6, 3)));

        // Answer to the e2 query arrives first and must not show for d2.
        s.handle(SessionEvent::Server(ServerEvent::ValidMoves {
            moves: vec![[5, 4], [4, 4]],
        }));
        assert!(s.legal_destinations().is_empty());

        s.handle(SessionEvent::Server(ServerEvent::ValidMoves {
            moves: vec![[5, 3], [4, 3]],
        }));
        assert_eq!(s.legal_destinations(), &[sq(5, 3), sq(4, 3)]);
    }

    #[test]
    fn rejoining_mid_game_follows_peer_turn() {
        let mut room = Room::new("g1", Variant::Chess);
        room.join("alice").unwrap();
        room.join("bob").unwrap();
        room.make_move("alice", sq(6, 4), sq(4, 4)).unwrap();

        // Alice reconnects after her first move.
        let (mut s, log) = session(Variant::Chess);
        s.join();
        s.handle(SessionEvent::Server(room.joined_event(Side::White)));
        assert_eq!(s.current_turn(), Side::Black);
        assert_eq!(s.board(), room.board());
        assert!(s.history().is_empty());

        let reply = room.make_move("bob", sq(1, 4), sq(3, 4)).unwrap();
        s.handle(SessionEvent::Server(reply));
        assert_eq!(s.current_turn(), Side::White);
        assert_eq!(s.current_turn(), room.history().side_to_move());
        assert_eq!(s.history().notation_lines(), vec!["1... e7-e5"]);
        assert_eq!(log.last_status().as_deref(), Some("White to move"));

        click(&mut s, 6, 3);
        assert_eq!(s.selection(), Some(sq(6, 3)));
    }

    #[test]
    fn move_made_with_nothing_to_record_still_passes_the_turn() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);
        // Neither board has a piece on the reported squares.
        s.handle(SessionEvent::Server(ServerEvent::MoveMade {
            board: Board::empty().to_wire(),
            status: "Black to move".into(),
            from_pos: [4, 4],
            to_pos: [3, 4],
            game_over: false,
            winner: None,
        }));
        assert_eq!(s.board(), &Board::empty());
        assert!(s.history().is_empty());
        assert_eq!(s.current_turn(), Side::Black);
    }

    #[test]
    fn move_made_turn_falls_back_to_alternation() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);
        s.handle(SessionEvent::Server(ServerEvent::MoveMade {
            board: Board::empty().to_wire(),
            status: "thinking".into(),
            from_pos: [4, 4],
            to_pos: [3, 4],
            game_over: false,
            winner: None,
        }));
        assert_eq!(s.current_turn(), Side::Black);
    }

    #[test]
    fn peer_rejection_surfaces_illegal_move() {
        let (mut s, log) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);
        click(&mut s, 6, 4);
        click(&mut s, 3, 4);
        s.handle(SessionEvent::Server(ServerEvent::error("Invalid move")));
        assert!(!s.awaiting_reply());
        assert!(s.selection().is_none());
        assert_eq!(
            log.notices(),
            vec![SessionError::IllegalMove {
                from: sq(6, 4),
                to: sq(3, 4)
            }]
        );
    }

    #[test]
    fn authoritative_board_heals_divergence() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::Black);
        // The peer's board differs from anything we expect locally.
        let theirs = Board::empty();
        s.handle(SessionEvent::Server(ServerEvent::MoveMade {
            board: theirs.to_wire(),
            status: "Black to move".into(),
            from_pos: [6, 4],
            to_pos: [4, 4],
            game_over: false,
            winner: None,
        }));
        assert_eq!(s.board(), &theirs);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn reported_game_over_is_final() {
        let (mut s, log) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);
        let board = s.board().to_wire();
        s.handle(SessionEvent::Server(ServerEvent::MoveMade {
            board,
            status: "White wins".into(),
            from_pos: [6, 4],
            to_pos: [4, 4],
            game_over: true,
            winner: Some(Side::White),
        }));
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.winner(), Some(Side::White));
        assert_eq!(log.game_over(), Some(Some(Side::White)));
        assert!(click(&mut s, 6, 3).is_empty());
    }

    #[test]
    fn reported_draw_has_no_winner() {
        let (mut s, log) = session(Variant::Checkers);
        s.join();
        s.handle(SessionEvent::Server(ServerEvent::GameJoined {
            game_id: "g1".into(),
            color: Side::Black,
            game_type: Variant::Checkers,
            board: Board::initial_layout(Variant::Checkers, &SymbolTable::checkers()).to_wire(),
            status: "White to move".into(),
        }));
        s.handle(SessionEvent::Server(ServerEvent::MoveMade {
            board: Board::empty().to_wire(),
            status: "Draw".into(),
            from_pos: [5, 0],
            to_pos: [4, 1],
            game_over: true,
            winner: None,
        }));
        assert_eq!(s.phase(), Phase::GameOver);
        assert_eq!(s.winner(), None);
        assert_eq!(s.outcome().unwrap().reason, EndReason::Reported);
        assert_eq!(log.game_over(), Some(None));
        assert_eq!(s.status(), "Draw");
    }

    #[test]
    fn channel_closed_mid_game_keeps_position() {
        let (mut s, log) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);
        let mut after = s.board().clone();
        let pawn = after.piece_at(sq(6, 4)).cloned().unwrap();
        after.apply(&Move::quiet(sq(6, 4), sq(4, 4), pawn)).unwrap();
        s.handle(SessionEvent::Server(ServerEvent::MoveMade {
            board: after.to_wire(),
            status: "Black to move".into(),
            from_pos: [6, 4],
            to_pos: [4, 4],
            game_over: false,
            winner: None,
        }));

        let effects = s.handle(SessionEvent::ChannelClosed);
        assert_eq!(effects, vec![Effect::CloseChannel]);
        assert_eq!(s.mode(), Mode::LocalFallback);
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.board(), &after);
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.current_turn(), Side::Black);
        assert!(matches!(log.notices().last(), Some(SessionError::ChannelError(_))));

        // Black's reply is now decided locally.
        click(&mut s, 1, 4);
        click(&mut s, 3, 4);
        assert_eq!(s.history().len(), 2);
        assert_eq!(s.current_turn(), Side::White);
    }

    #[test]
    fn opponent_disconnect_ends_game_keeping_board() {
        let (mut s, log) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);
        click(&mut s, 6, 4);
        let board = s.board().clone();

        let effects = s.handle(SessionEvent::Server(ServerEvent::OpponentDisconnected));
        assert_eq!(effects, vec![Effect::CloseChannel]);
        assert_eq!(log.notices(), vec![SessionError::OpponentLost]);
        assert_eq!(s.board(), &board);
        assert!(s.history().is_empty());
        assert_eq!(s.phase(), Phase::GameOver);
        assert!(log.game_over().is_none());

        // No further make_move can be produced.
        assert!(click(&mut s, 6, 4).is_empty());
        assert!(click(&mut s, 4, 4).is_empty());
    }

    #[test]
    fn channel_failure_while_joining_starts_local_game() {
        let (mut s, log) = session(Variant::Chess);
        s.join();
        let effects = s.handle(SessionEvent::ChannelFailed("refused".into()));
        assert_eq!(effects, vec![Effect::CloseChannel]);
        assert_eq!(s.phase(), Phase::Active);
        assert_eq!(s.mode(), Mode::LocalFallback);
        assert_eq!(
            s.board(),
            &Board::initial_layout(Variant::Chess, &SymbolTable::chess())
        );
        assert_eq!(
            log.notices(),
            vec![SessionError::ChannelError("refused".into())]
        );
    }

    #[test]
    fn join_timeout_downgrades() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        s.handle(SessionEvent::JoinTimedOut);
        assert_eq!(s.mode(), Mode::LocalFallback);
        // Late confirmation no longer applies.
        joined(&mut s, Side::Black);
        assert_eq!(s.mode(), Mode::LocalFallback);
        assert_eq!(s.local_side(), Side::White);
    }

    #[test]
    fn reply_timeout_downgrades_keeping_board() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);
        click(&mut s, 6, 4);
        click(&mut s, 4, 4);
        let board = s.board().clone();

        // A stale timer is ignored.
        s.handle(SessionEvent::ReplyTimedOut { seq: 99 });
        assert!(s.awaiting_reply());

        let effects = s.handle(SessionEvent::ReplyTimedOut { seq: 1 });
        assert_eq!(effects, vec![Effect::CloseChannel]);
        assert_eq!(s.mode(), Mode::LocalFallback);
        assert_eq!(s.board(), &board);
        assert!(!s.awaiting_reply());

        // Local play continues from the same position.
        click(&mut s, 6, 4);
        click(&mut s, 4, 4);
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn channel_loss_after_game_over_is_ignored() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::White);
        s.handle(SessionEvent::Server(ServerEvent::OpponentDisconnected));
        assert!(s.handle(SessionEvent::ChannelClosed).is_empty());
        assert_eq!(s.phase(), Phase::GameOver);
    }

    #[test]
    fn error_while_joining_downgrades() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        s.handle(SessionEvent::Server(ServerEvent::error("Game is full")));
        assert_eq!(s.mode(), Mode::LocalFallback);
        assert_eq!(s.phase(), Phase::Active);
    }

    // --- resign / exit ---

    #[test]
    fn resign_hands_win_to_opponent() {
        let (mut s, log) = session(Variant::Chess);
        s.start_local(Mode::VsBot, Side::White);
        assert!(s.handle(SessionEvent::Resign).is_empty());
        assert_eq!(s.winner(), Some(Side::Black));
        assert_eq!(log.game_over(), Some(Some(Side::Black)));
        assert_eq!(s.status(), "White resigned, Black wins");
    }

    #[test]
    fn remote_resign_closes_channel() {
        let (mut s, _) = session(Variant::Chess);
        s.join();
        joined(&mut s, Side::Black);
        assert_eq!(s.handle(SessionEvent::Resign), vec![Effect::CloseChannel]);
        assert_eq!(s.winner(), Some(Side::White));
    }

    #[test]
    fn exit_is_terminal() {
        let (mut s, _) = session(Variant::Chess);
        s.start_local(Mode::LocalFallback, Side::White);
        assert_eq!(s.handle(SessionEvent::Exit), vec![Effect::CloseChannel]);
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.is_terminated());
        assert!(click(&mut s, 6, 4).is_empty());
        assert!(s.join().is_empty());
        assert!(s.start_local(Mode::VsBot, Side::White).is_empty());
    }

    // --- move reconstruction ---

    #[test]
    fn reconstruct_checkers_jump() {
        let mut before = Board::empty();
        let white = Piece::new(Side::White, PieceKind::Man, "w");
        let black = Piece::new(Side::Black, PieceKind::Man, "b");
        before.set(sq(5, 2), Some(white.clone()));
        before.set(sq(4, 3), Some(black.clone()));
        let mut after = Board::empty();
        after.set(sq(3, 4), Some(white.clone()));

        let mv = reconstruct_move(&before, &after, sq(5, 2), sq(3, 4), Variant::Checkers).unwrap();
        assert_eq!(mv.captured, Some(black));
        assert_eq!(mv.captured_at, Some(sq(4, 3)));
    }

    #[test]
    fn reconstruct_needs_a_piece() {
        let empty = Board::empty();
        assert!(reconstruct_move(&empty, &empty, sq(6, 4), sq(4, 4), Variant::Chess).is_none());
    }
}
