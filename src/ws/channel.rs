//! Client side of the synchronization channel.
//!
//! `ChannelAdapter` owns one WebSocket connection to the authoritative
//! peer. Outbound commands go through an unbounded queue drained by a
//! writer task; inbound frames are dispatched by a reader task straight
//! into the session's event queue.

use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::engine::types::SessionError;
use crate::session::SessionEvent;

use super::dispatcher::dispatch_or_drop;
use super::messages::ClientCommand;

/// Lifecycle: `Connecting → Connected → {Disconnected, Failed}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
    Failed,
}

#[derive(Debug)]
pub struct ChannelAdapter {
    url: String,
    state: Arc<watch::Sender<ConnectionState>>,
    outbound: Option<mpsc::UnboundedSender<ClientCommand>>,
    writer: Option<JoinHandle<()>>,
    reader: Option<JoinHandle<()>>,
}

impl ChannelAdapter {
    /// Connect to `url`, giving up after `timeout`.
    ///
    /// Never fails outright: an unreachable peer leaves the adapter in
    /// `Failed` and pushes `SessionEvent::ChannelFailed` into `events`.
    pub async fn connect(
        url: &str,
        timeout: Duration,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Connecting);
        let mut adapter = Self {
            url: url.to_string(),
            state: Arc::new(state),
            outbound: None,
            writer: None,
            reader: None,
        };

        debug!(url, "connecting");
        let socket = match tokio::time::timeout(timeout, connect_async(url)).await {
            Ok(Ok((socket, _response))) => socket,
            Ok(Err(e)) => {
                adapter.fail(&events, e.to_string());
                return adapter;
            }
            Err(_) => {
                adapter.fail(
                    &events,
                    format!("no connection within {}ms", timeout.as_millis()),
                );
                return adapter;
            }
        };

        adapter.state.send_replace(ConnectionState::Connected);
        info!(url, "channel connected");

        let (mut sink, mut stream) = socket.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<ClientCommand>();

        // Writer task: outbound commands → WS sink.
        let writer = tokio::spawn(async move {
            while let Some(cmd) = rx.recv().await {
                debug!(tag = cmd.tag(), "outbound");
                if sink.send(Message::text(cmd.to_json())).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        // Reader task: WS frames → session queue.
        let reader_state = adapter.state.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        if let Some(event) = dispatch_or_drop(text.as_str())
                            && events.send(event).is_err()
                        {
                            // Session is gone.
                            return;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "channel read failed");
                        break;
                    }
                }
            }
            reader_state.send_replace(ConnectionState::Disconnected);
            info!("channel closed by peer");
            let _ = events.send(SessionEvent::ChannelClosed);
        });

        adapter.outbound = Some(tx);
        adapter.writer = Some(writer);
        adapter.reader = Some(reader);
        adapter
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Queue a command for the peer.
    pub fn send(&self, cmd: ClientCommand) -> Result<(), SessionError> {
        let state = self.state();
        if state != ConnectionState::Connected {
            return Err(SessionError::ChannelError(format!(
                "cannot send {}: channel {state:?}",
                cmd.tag()
            )));
        }
        self.outbound
            .as_ref()
            .ok_or_else(|| SessionError::ChannelError("no writer".to_string()))?
            .send(cmd)
            .map_err(|e| SessionError::ChannelError(format!("writer stopped: {}", e.0.tag())))
    }

    /// Shut the connection down. The writer flushes and sends a close
    /// frame; the reader stops without reporting `ChannelClosed`.
    pub fn close(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
        // Dropping the sender ends the writer loop.
        self.outbound = None;
        self.writer = None;
        if self.state() != ConnectionState::Failed {
            self.state.send_replace(ConnectionState::Disconnected);
        }
        debug!(url = %self.url, "channel closed");
    }

    fn fail(&mut self, events: &mpsc::UnboundedSender<SessionEvent>, reason: String) {
        warn!(url = %self.url, reason, "channel unreachable");
        self.state.send_replace(ConnectionState::Failed);
        let _ = events.send(SessionEvent::ChannelFailed(reason));
    }
}

impl Drop for ChannelAdapter {
    fn drop(&mut self) {
        // The writer ends on its own once `outbound` is dropped.
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_peer_reports_failure() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        // Port 9 (discard) on localhost is closed in test environments.
        let adapter = ChannelAdapter::connect("ws://127.0.0.1:9/ws", Duration::from_secs(2), tx).await;
        assert_eq!(adapter.state(), ConnectionState::Failed);
        assert!(matches!(
            rx.recv().await,
            Some(SessionEvent::ChannelFailed(_))
        ));
    }

    #[tokio::test]
    async fn send_on_failed_channel_is_channel_error() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let adapter = ChannelAdapter::connect("ws://127.0.0.1:9/ws", Duration::from_secs(2), tx).await;
        let err = adapter
            .send(ClientCommand::join_game("g", Default::default(), "p"))
            .unwrap_err();
        assert!(matches!(err, SessionError::ChannelError(_)));
    }

    #[tokio::test]
    async fn close_keeps_failed_state() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut adapter = ChannelAdapter::connect("ws://127.0.0.1:9/ws", Duration::from_secs(2), tx).await;
        adapter.close();
        assert_eq!(adapter.state(), ConnectionState::Failed);
    }
}
