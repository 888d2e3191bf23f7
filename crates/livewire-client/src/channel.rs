use std::fmt;

use serde::{Deserialize, Serialize};

/// The two independent streams a client keeps open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Public stream, no credential.
    Broadcast,
    /// Per-user stream, credential embedded in the target.
    User,
}

impl ChannelKind {
    pub const ALL: [ChannelKind; 2] = [ChannelKind::Broadcast, ChannelKind::User];

    pub fn requires_credential(self) -> bool {
        matches!(self, ChannelKind::User)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Broadcast => "broadcast",
            ChannelKind::User => "user",
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connectivity of one channel as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelStatus::Connecting => "connecting",
            ChannelStatus::Connected => "connected",
            ChannelStatus::Disconnected => "disconnected",
        };
        f.write_str(s)
    }
}
