use huddle_core::IceServerConfig;
use std::time::Duration;

/// Runtime knobs of the hub. The binary fills this from flags and environment.
#[derive(Debug, Clone)]
pub struct HubConfig {
    pub ice_servers: Vec<IceServerConfig>,
    /// Typing indicators are cleared when not refreshed within this window.
    pub typing_timeout: Duration,
    /// An empty room actor shuts down after this long.
    pub room_idle: Duration,
    pub room_queue: usize,
    pub default_history_limit: usize,
    pub max_history_limit: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun("stun:stun.l.google.com:19302")],
            typing_timeout: Duration::from_millis(3000),
            room_idle: Duration::from_secs(60),
            room_queue: 100,
            default_history_limit: 200,
            max_history_limit: 1000,
        }
    }
}
