//! Periodic removal of rooms that outlived `max_game_duration_secs`.

use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::info;

use super::state::SharedState;

/// Remove every room older than the configured maximum. Returns the ids
/// of removed rooms.
pub async fn sweep(state: &SharedState) -> Vec<String> {
    let max_age = Duration::from_secs(state.config.max_game_duration_secs);
    let now = Utc::now();

    let expired: Vec<String> = {
        let mut rooms = state.rooms.write().await;
        let expired: Vec<String> = rooms
            .values()
            .filter(|room| room.is_older_than(max_age, now))
            .map(|room| room.id().to_string())
            .collect();
        for id in &expired {
            rooms.remove(id);
        }
        expired
    };

    for id in &expired {
        state.ws.drop_game(id).await;
    }
    if !expired.is_empty() {
        info!(count = expired.len(), "expired rooms removed");
    }
    expired
}

/// Run [`sweep`] every `cleanup_interval_secs` until the runtime stops.
pub fn spawn_cleanup(state: SharedState) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.cleanup_interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            sweep(&state).await;
        }
    })
}
