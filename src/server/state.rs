use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::AppConfig;

use super::manager::WsManager;
use super::room::Room;

/// Rooms stored by game id.
pub type RoomStore = RwLock<HashMap<String, Room>>;

/// Shared server state passed to all handlers via Axum's State extractor.
pub struct ServerState {
    pub rooms: RoomStore,
    pub ws: Arc<WsManager>,
    pub config: AppConfig,
    pub start_time: std::time::Instant,
}

pub type SharedState = Arc<ServerState>;

impl ServerState {
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(ServerState {
            rooms: RwLock::new(HashMap::new()),
            ws: WsManager::new(),
            config,
            start_time: std::time::Instant::now(),
        })
    }
}
