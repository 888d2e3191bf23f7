//! Observable client lifecycle events.

use std::time::Duration;

use tokio::sync::broadcast;

use crate::channel::{ChannelKind, ChannelStatus};

/// Lifecycle notifications; retry and refresh details never reach
/// message handlers, only this stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    StatusChanged {
        channel: ChannelKind,
        status: ChannelStatus,
    },
    ReconnectScheduled {
        channel: ChannelKind,
        attempt: u32,
        delay: Duration,
    },
    /// Automatic reconnects stopped; the channel stays disconnected until
    /// connected again explicitly.
    ReconnectsExhausted {
        channel: ChannelKind,
        attempts: u32,
    },
    CredentialRefreshed,
    /// The upstream refresh failed. Hosts typically end the session here.
    CredentialRefreshFailed {
        error: String,
    },
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ClientEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}
