//! Server-wide configuration.

use std::time::Duration;

use partyroom_room::RoomConfig;
use partyroom_session::RateLimitConfig;

/// Everything [`PartyroomServer`](crate::PartyroomServer) needs besides its
/// store.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// A connection that sends nothing for this long is dropped. Clients
    /// heartbeat well inside it.
    pub idle_timeout: Duration,
    /// Larger inbound frames are rejected without being parsed.
    pub max_frame_len: usize,
    /// Longest menu a client may add, in characters.
    pub max_menu_len: usize,
    /// Bound on every call into the store.
    pub store_timeout: Duration,
    /// How often expired rooms are looked for.
    pub reaper_interval: Duration,
    pub room: RoomConfig,
    pub rate_limit: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            idle_timeout: Duration::from_secs(60),
            max_frame_len: 16 * 1024,
            max_menu_len: 50,
            store_timeout: Duration::from_secs(2),
            reaper_interval: Duration::from_secs(30),
            room: RoomConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}
