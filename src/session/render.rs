//! Render callback contract towards the UI layer.
//!
//! The session core never draws anything. It reports every visible change
//! through a `RenderSink` and receives square clicks back as events.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::engine::board::Board;
use crate::engine::types::{SessionError, Side, Square};

/// Callbacks the session invokes whenever something visible changes.
pub trait RenderSink: Send {
    fn on_board_changed(&mut self, board: &Board);

    fn on_status_changed(&mut self, status: &str);

    /// Current selection and its legal destinations. `None` clears both.
    fn on_selection_changed(&mut self, selected: Option<Square>, destinations: &[Square]);

    /// `winner == None` means a draw.
    fn on_game_over(&mut self, winner: Option<Side>);

    /// Non-fatal signals: illegal moves, lost opponents, channel downgrades.
    fn on_notice(&mut self, _notice: &SessionError) {}
}

/// Sink for headless sessions: every callback becomes a trace event.
#[derive(Debug, Default)]
pub struct TracingSink;

impl RenderSink for TracingSink {
    fn on_board_changed(&mut self, board: &Board) {
        debug!(pieces = board.count(), "board changed");
    }

    fn on_status_changed(&mut self, status: &str) {
        info!(status, "status changed");
    }

    fn on_selection_changed(&mut self, selected: Option<Square>, destinations: &[Square]) {
        debug!(?selected, destinations = destinations.len(), "selection changed");
    }

    fn on_game_over(&mut self, winner: Option<Side>) {
        info!(?winner, "game over");
    }

    fn on_notice(&mut self, notice: &SessionError) {
        info!(%notice, "notice");
    }
}

// ---------------------------------------------------------------------------
// RecordingSink
// ---------------------------------------------------------------------------

/// One recorded render callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderCall {
    Board(Board),
    Status(String),
    Selection(Option<Square>, Vec<Square>),
    GameOver(Option<Side>),
    Notice(SessionError),
}

/// Records every callback into a shared log. The log handle stays usable
/// after the sink has been moved into a session.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<RenderCall>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all calls so far.
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn notices(&self) -> Vec<SessionError> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RenderCall::Notice(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<String> {
        self.calls().into_iter().rev().find_map(|c| match c {
            RenderCall::Status(s) => Some(s),
            _ => None,
        })
    }

    pub fn game_over(&self) -> Option<Option<Side>> {
        self.calls().into_iter().find_map(|c| match c {
            RenderCall::GameOver(w) => Some(w),
            _ => None,
        })
    }

    fn push(&self, call: RenderCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl RenderSink for RecordingSink {
    fn on_board_changed(&mut self, board: &Board) {
        self.push(RenderCall::Board(board.clone()));
    }

    fn on_status_changed(&mut self, status: &str) {
        self.push(RenderCall::Status(status.to_string()));
    }

    fn on_selection_changed(&mut self, selected: Option<Square>, destinations: &[Square]) {
        self.push(RenderCall::Selection(selected, destinations.to_vec()));
    }

    fn on_game_over(&mut self, winner: Option<Side>) {
        self.push(RenderCall::GameOver(winner));
    }

    fn on_notice(&mut self, notice: &SessionError) {
        self.push(RenderCall::Notice(notice.clone()));
    }
}
