//! Connection registry: which clients listen to which game, and fan-out
//! of events to them.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc};
use tracing::{debug, warn};

use crate::ws::messages::ServerEvent;

/// Sending half of one client's outbound queue. The socket handler owns
/// the receiving half.
pub type ClientSender = mpsc::UnboundedSender<ServerEvent>;

/// Unique id of a connected client.
pub type ClientId = u64;

#[derive(Debug)]
pub struct WsManager {
    /// game_id → { client_id → sender }
    subs: RwLock<HashMap<String, HashMap<ClientId, ClientSender>>>,
    next_id: AtomicU64,
}

impl WsManager {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Allocate an id for a new connection.
    pub fn next_client_id(&self) -> ClientId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Start delivering a game's events to `client_id`.
    pub async fn register(&self, game_id: &str, client_id: ClientId, tx: ClientSender) {
        let mut subs = self.subs.write().await;
        subs.entry(game_id.to_string()).or_default().insert(client_id, tx);
        debug!(game_id, client_id, "client registered");
    }

    pub async fn unregister(&self, game_id: &str, client_id: ClientId) {
        let mut subs = self.subs.write().await;
        if let Some(clients) = subs.get_mut(game_id) {
            clients.remove(&client_id);
            if clients.is_empty() {
                subs.remove(game_id);
            }
        }
        debug!(game_id, client_id, "client unregistered");
    }

    /// Forget a game and all of its listeners.
    pub async fn drop_game(&self, game_id: &str) {
        self.subs.write().await.remove(game_id);
    }

    /// Send `event` to every client of the game.
    pub async fn broadcast(&self, game_id: &str, event: ServerEvent) {
        self.fan_out(game_id, None, event).await;
    }

    /// Send `event` to every client of the game except `skip`.
    pub async fn broadcast_except(&self, game_id: &str, skip: ClientId, event: ServerEvent) {
        self.fan_out(game_id, Some(skip), event).await;
    }

    async fn fan_out(&self, game_id: &str, skip: Option<ClientId>, event: ServerEvent) {
        let subs = self.subs.read().await;
        let Some(clients) = subs.get(game_id) else {
            return;
        };
        let mut stale: Vec<ClientId> = Vec::new();
        for (&cid, tx) in clients {
            if Some(cid) == skip {
                continue;
            }
            if tx.send(event.clone()).is_err() {
                stale.push(cid);
            }
        }
        drop(subs); // release read lock before write

        if !stale.is_empty() {
            let mut subs = self.subs.write().await;
            if let Some(clients) = subs.get_mut(game_id) {
                for cid in &stale {
                    clients.remove(cid);
                    warn!(game_id, client_id = cid, "removed stale client");
                }
                if clients.is_empty() {
                    subs.remove(game_id);
                }
            }
        }
    }

    pub async fn subscriber_count(&self, game_id: &str) -> usize {
        let subs = self.subs.read().await;
        subs.get(game_id).map_or(0, |c| c.len())
    }

    /// Total number of registered connections across all games.
    pub async fn total_connections(&self) -> usize {
        let subs = self.subs.read().await;
        subs.values().map(|c| c.len()).sum()
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self {
            subs: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}
