//! Change relay configuration.

use serde::{Deserialize, Serialize};

/// Default per-table event queue capacity.
const fn default_queue_capacity() -> usize {
    256
}

/// Default heartbeat interval in seconds.
const fn default_heartbeat_secs() -> u64 {
    30
}

/// Default reconnect backoff floor in milliseconds.
const fn default_reconnect_base_ms() -> u64 {
    1_000
}

/// Default reconnect backoff ceiling in milliseconds.
const fn default_reconnect_max_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Bounded per-table queue capacity. A full queue applies backpressure
    /// to the feed router instead of piling up writes unboundedly.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Interval between Phoenix heartbeat frames, in seconds.
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_secs: u64,

    /// Initial delay before a feed reconnect attempt, in milliseconds.
    #[serde(default = "default_reconnect_base_ms")]
    pub reconnect_base_ms: u64,

    /// Backoff cap between feed reconnect attempts, in milliseconds.
    #[serde(default = "default_reconnect_max_ms")]
    pub reconnect_max_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            heartbeat_secs: default_heartbeat_secs(),
            reconnect_base_ms: default_reconnect_base_ms(),
            reconnect_max_ms: default_reconnect_max_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = RelayConfig::default();
        assert_eq!(config.queue_capacity, 256);
        assert_eq!(config.heartbeat_secs, 30);
        assert_eq!(config.reconnect_base_ms, 1_000);
        assert_eq!(config.reconnect_max_ms, 30_000);
    }
}
