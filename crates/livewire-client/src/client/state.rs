//! Per-channel connection state.

use std::sync::Arc;

use crate::channel::{ChannelKind, ChannelStatus};
use crate::message::InboundMessage;
use crate::scheduler::TimerId;
use crate::transport::{ReadyState, Transport};

/// Callback receiving every message delivered on a channel.
pub type MessageHandler = Arc<dyn Fn(InboundMessage) + Send + Sync>;

/// Identifies one opened transport; events from older ids are stale.
pub(crate) type ConnectionId = u64;

pub(crate) struct ActiveTransport {
    pub(crate) id: ConnectionId,
    pub(crate) handle: Arc<dyn Transport>,
}

/// Lifecycle record of one channel.
///
/// A channel never holds a transport and a pending reconnect timer at
/// the same time.
#[derive(Default)]
pub(crate) struct ConnectionState {
    pub(crate) transport: Option<ActiveTransport>,
    pub(crate) attempt: u32,
    pub(crate) reconnect_timer: Option<TimerId>,
    pub(crate) heartbeat_timer: Option<TimerId>,
    pub(crate) intentionally_closed: bool,
    pub(crate) handler: Option<MessageHandler>,
}

impl ConnectionState {
    pub(crate) fn is_current(&self, id: ConnectionId) -> bool {
        self.transport.as_ref().is_some_and(|active| active.id == id)
    }

    pub(crate) fn status(&self) -> ChannelStatus {
        match &self.transport {
            None => ChannelStatus::Disconnected,
            Some(active) => match active.handle.ready_state() {
                ReadyState::Open => ChannelStatus::Connected,
                ReadyState::Connecting => ChannelStatus::Connecting,
                ReadyState::Closing | ReadyState::Closed => ChannelStatus::Disconnected,
            },
        }
    }

    /// Whether an in-flight refresh result should still reopen the channel.
    pub(crate) fn awaiting_recovery(&self) -> bool {
        !self.intentionally_closed && self.transport.is_none() && self.reconnect_timer.is_none()
    }
}

/// Both channels, always present.
#[derive(Default)]
pub(crate) struct Channels {
    broadcast: ConnectionState,
    user: ConnectionState,
}

impl Channels {
    pub(crate) fn get(&self, kind: ChannelKind) -> &ConnectionState {
        match kind {
            ChannelKind::Broadcast => &self.broadcast,
            ChannelKind::User => &self.user,
        }
    }

    pub(crate) fn get_mut(&mut self, kind: ChannelKind) -> &mut ConnectionState {
        match kind {
            ChannelKind::Broadcast => &mut self.broadcast,
            ChannelKind::User => &mut self.user,
        }
    }
}
