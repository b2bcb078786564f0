use crate::engine::types::Variant;

/// Configuration parsed from environment variables.
///
/// One struct serves both roles: the authoritative server reads the bind
/// and cleanup fields, a client session reads the channel and bot fields.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server bind host.
    pub host: String,
    /// Server listen port.
    pub port: u16,
    /// WebSocket URL of the authoritative peer.
    pub server_url: String,
    /// Bound on connecting and on waiting for `game_joined`, in ms.
    pub connect_timeout_ms: u64,
    /// Bound on waiting for a move confirmation, in ms.
    pub move_timeout_ms: u64,
    /// Pause before the local opponent moves, in ms.
    pub bot_delay_ms: u64,
    pub game_type: Variant,
    /// Start against the local opponent instead of joining a remote game.
    pub vs_bot: bool,
    /// Enable host platform hooks.
    pub platform: bool,
    /// Rooms older than this are removed by the cleanup task.
    pub max_game_duration_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparsable values fall
    /// back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = AppConfig::default();
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        AppConfig {
            host: lookup("HOST").unwrap_or(d.host),
            port: lookup("PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(d.port),
            server_url: lookup("DUEL_SERVER_URL").unwrap_or(d.server_url),
            connect_timeout_ms: parsed("DUEL_CONNECT_TIMEOUT").unwrap_or(d.connect_timeout_ms),
            move_timeout_ms: parsed("DUEL_MOVE_TIMEOUT").unwrap_or(d.move_timeout_ms),
            bot_delay_ms: parsed("DUEL_BOT_DELAY").unwrap_or(d.bot_delay_ms),
            game_type: lookup("DUEL_GAME_TYPE")
                .and_then(|v| Variant::from_str_loose(&v))
                .unwrap_or(d.game_type),
            vs_bot: lookup("DUEL_VS_BOT").map_or(d.vs_bot, |v| truthy(&v)),
            platform: lookup("DUEL_PLATFORM").map_or(d.platform, |v| truthy(&v)),
            max_game_duration_secs: parsed("MAX_GAME_DURATION").unwrap_or(d.max_game_duration_secs),
            cleanup_interval_secs: parsed("CLEANUP_INTERVAL").unwrap_or(d.cleanup_interval_secs),
        }
    }

    /// Socket address string for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "0.0.0.0".to_string(),
            port: 5002,
            server_url: "ws://127.0.0.1:5002/ws".to_string(),
            connect_timeout_ms: 3000,
            move_timeout_ms: 10_000,
            bot_delay_ms: 500,
            game_type: Variant::Chess,
            vs_bot: false,
            platform: false,
            max_game_duration_secs: 3600,
            cleanup_interval_secs: 300,
        }
    }
}

fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
