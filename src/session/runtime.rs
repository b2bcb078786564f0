//! Async driver for a `Session`.
//!
//! All inputs (clicks, channel frames, timers, exit) enter one mpsc queue
//! and are handled strictly one at a time. Effects returned by the
//! session are carried out here: sending on the channel, arming timers,
//! closing the connection.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::engine::types::Side;
use crate::ws::channel::ChannelAdapter;

use super::state::{Effect, Mode, Session, SessionEvent};

/// Timings used by the runtime.
#[derive(Clone, Copy, Debug)]
pub struct RuntimeOptions {
    /// Bound on connecting and on waiting for `game_joined`.
    pub connect_timeout: Duration,
    /// Bound on waiting for the reply to a move.
    pub move_timeout: Duration,
    /// Cosmetic pause before the local opponent moves.
    pub bot_delay: Duration,
}

impl RuntimeOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            connect_timeout: Duration::from_millis(config.connect_timeout_ms),
            move_timeout: Duration::from_millis(config.move_timeout_ms),
            bot_delay: Duration::from_millis(config.bot_delay_ms),
        }
    }
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

pub struct SessionRuntime {
    session: Session,
    options: RuntimeOptions,
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    channel: Option<ChannelAdapter>,
    timers: Vec<JoinHandle<()>>,
}

impl SessionRuntime {
    pub fn new(session: Session, options: RuntimeOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session,
            options,
            tx,
            rx,
            channel: None,
            timers: Vec::new(),
        }
    }

    /// Sender for feeding events (clicks, resign, exit) into the queue.
    pub fn events(&self) -> mpsc::UnboundedSender<SessionEvent> {
        self.tx.clone()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn channel(&self) -> Option<&ChannelAdapter> {
        self.channel.as_ref()
    }

    /// Join a remote game at `url`. A failed connection is queued as
    /// `ChannelFailed` and handled like any other event.
    pub async fn start_remote(&mut self, url: &str) {
        let effects = self.session.join();
        if effects.is_empty() {
            return;
        }
        let channel = ChannelAdapter::connect(url, self.options.connect_timeout, self.tx.clone()).await;
        self.channel = Some(channel);
        self.perform(effects);
    }

    pub fn start_local(&mut self, mode: Mode, local_side: Side) {
        let effects = self.session.start_local(mode, local_side);
        self.perform(effects);
    }

    /// Handle the next queued event. Returns `false` once the session has
    /// been torn down.
    pub async fn step(&mut self) -> bool {
        if self.session.is_terminated() {
            return false;
        }
        let Some(event) = self.rx.recv().await else {
            return false;
        };
        let effects = self.session.handle(event);
        self.perform(effects);
        !self.session.is_terminated()
    }

    /// Process events until `done` holds for the session or `limit`
    /// elapses. Returns whether `done` was reached.
    pub async fn run_until<F>(&mut self, limit: Duration, done: F) -> bool
    where
        F: Fn(&Session) -> bool,
    {
        let deadline = tokio::time::Instant::now() + limit;
        while !done(&self.session) {
            match tokio::time::timeout_at(deadline, self.step()).await {
                Ok(true) => {}
                Ok(false) => return done(&self.session),
                Err(_) => return false,
            }
        }
        true
    }

    /// Process events until the session exits, then hand it back.
    pub async fn run(mut self) -> Session {
        while self.step().await {}
        self.shutdown();
        self.session
    }

    fn perform(&mut self, effects: Vec<Effect>) {
        self.timers.retain(|t| !t.is_finished());
        for effect in effects {
            match effect {
                Effect::Send(cmd) => match &self.channel {
                    Some(channel) => {
                        // Channel failures reach the queue on their own.
                        if let Err(err) = channel.send(cmd) {
                            warn!(%err, "command not sent");
                        }
                    }
                    None => debug!(tag = cmd.tag(), "no channel; command dropped"),
                },
                Effect::ScheduleBotMove => self.arm(self.options.bot_delay, SessionEvent::BotTurn),
                Effect::AwaitJoin => self.arm(self.options.connect_timeout, SessionEvent::JoinTimedOut),
                Effect::AwaitReply { seq } => {
                    self.arm(self.options.move_timeout, SessionEvent::ReplyTimedOut { seq })
                }
                Effect::CloseChannel => {
                    if let Some(mut channel) = self.channel.take() {
                        channel.close();
                    }
                }
            }
        }
    }

    /// Push `event` after `delay`.
    fn arm(&mut self, delay: Duration, event: SessionEvent) {
        let tx = self.tx.clone();
        self.timers.push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(event);
        }));
    }

    fn shutdown(&mut self) {
        for timer in self.timers.drain(..) {
            timer.abort();
        }
        if let Some(mut channel) = self.channel.take() {
            channel.close();
        }
    }
}
