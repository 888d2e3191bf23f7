//! Reconnect, heartbeat, and transport timing configuration.

use serde::{Deserialize, Serialize};

/// Reconnect backoff policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Automatic attempts before a channel gives up (valid range: 1-1000).
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds (valid range: 100-60000).
    pub base_interval_ms: u64,
    /// Ceiling applied to the doubled delay (valid range: 1000-600000).
    pub max_interval_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            base_interval_ms: 1000,
            max_interval_ms: 30_000,
        }
    }
}

/// Liveness ping configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatConfig {
    /// Ping period in milliseconds (valid range: 1000-600000).
    pub ping_interval_ms: u64,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            ping_interval_ms: 30_000,
        }
    }
}

/// WebSocket transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Handshake timeout in milliseconds (valid range: 1000-120000).
    pub connect_timeout_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 15_000,
        }
    }
}
