//! Server endpoint configuration.

use serde::{Deserialize, Serialize};

/// Where the two channels connect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    /// WebSocket URL of the public broadcast channel.
    pub broadcast_url: String,
    /// WebSocket URL of the per-user channel (credential is appended).
    pub user_url: String,
    /// Query parameter carrying the credential on the user channel.
    pub token_param: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            broadcast_url: "ws://localhost:8000/ws/broadcast/".into(),
            user_url: "ws://localhost:8000/ws/notifications/".into(),
            token_param: "token".into(),
        }
    }
}
