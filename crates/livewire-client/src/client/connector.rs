//! Opening transports and reacting to their events.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::channel::{ChannelKind, ChannelStatus};
use crate::credentials::{Credential, RefreshError};
use crate::events::ClientEvent;
use crate::message::InboundMessage;
use crate::transport::{
    redact_target, EventSink, TransportEvent, CREDENTIAL_EXPIRED, NORMAL_CLOSURE,
};

use super::state::{ActiveTransport, ConnectionId};
use super::Shared;

impl Shared {
    // -----------------------------------------------------------------------
    // Connect / Disconnect
    // -----------------------------------------------------------------------

    /// Open a fresh transport for `kind`, replacing any existing one.
    pub(crate) fn connect_channel(self: &Arc<Self>, kind: ChannelKind) {
        let target = self
            .endpoints
            .target(kind, &self.credentials.current());
        let id = self.next_connection.fetch_add(1, Ordering::Relaxed) + 1;

        if self.settings.log_targets {
            info!(channel = %kind, connection = id, target = %target, "Opening channel");
        } else {
            info!(
                channel = %kind,
                connection = id,
                target = %redact_target(&target),
                "Opening channel"
            );
        }

        // Open and publish under the lock so a concurrent connect cannot
        // install a second transport and Connected never precedes Connecting.
        let previous = {
            let mut channels = self.lock_channels();
            let state = channels.get_mut(kind);
            self.stop_heartbeat(state);
            if let Some(timer) = state.reconnect_timer.take() {
                self.scheduler.cancel(timer);
            }
            let handle = self.transports.open(&target, self.event_sink(kind, id));
            self.events.publish(ClientEvent::StatusChanged {
                channel: kind,
                status: ChannelStatus::Connecting,
            });
            state.transport.replace(ActiveTransport { id, handle })
        };

        if let Some(previous) = previous {
            debug!(channel = %kind, connection = previous.id, "Closing superseded transport");
            previous.handle.close(NORMAL_CLOSURE, "Reconnecting");
        }
    }

    /// Stop `kind` for good: no reconnects until the next explicit connect.
    pub(crate) fn disconnect_channel(&self, kind: ChannelKind, reason: &str) {
        let transport = {
            let mut channels = self.lock_channels();
            let state = channels.get_mut(kind);
            state.intentionally_closed = true;
            self.stop_heartbeat(state);
            if let Some(timer) = state.reconnect_timer.take() {
                self.scheduler.cancel(timer);
            }
            state.transport.take()
        };

        if let Some(active) = transport {
            info!(channel = %kind, connection = active.id, reason, "Disconnecting channel");
            active.handle.close(NORMAL_CLOSURE, reason);
            self.events.publish(ClientEvent::StatusChanged {
                channel: kind,
                status: ChannelStatus::Disconnected,
            });
        }
    }

    fn event_sink(self: &Arc<Self>, kind: ChannelKind, id: ConnectionId) -> EventSink {
        let shared = Arc::downgrade(self);
        EventSink::new(move |event| {
            if let Some(shared) = shared.upgrade() {
                shared.handle_event(kind, id, event);
            }
        })
    }

    // -----------------------------------------------------------------------
    // Transport Events
    // -----------------------------------------------------------------------

    pub(crate) fn handle_event(
        self: &Arc<Self>,
        kind: ChannelKind,
        id: ConnectionId,
        event: TransportEvent,
    ) {
        match event {
            TransportEvent::Opened => self.on_open(kind, id),
            TransportEvent::Message(text) => self.on_message(kind, id, text),
            TransportEvent::Error(error) => {
                // The close that follows drives recovery.
                debug!(channel = %kind, connection = id, error = %error, "Transport error");
            }
            TransportEvent::Closed { code, reason } => self.on_close(kind, id, code, reason),
        }
    }

    fn on_open(self: &Arc<Self>, kind: ChannelKind, id: ConnectionId) {
        {
            let mut channels = self.lock_channels();
            let state = channels.get_mut(kind);
            if !state.is_current(id) {
                debug!(channel = %kind, connection = id, "Ignoring open from superseded transport");
                return;
            }
            state.attempt = 0;
        }

        info!(channel = %kind, connection = id, "Channel connected");
        self.start_heartbeat(kind, id);
        self.events.publish(ClientEvent::StatusChanged {
            channel: kind,
            status: ChannelStatus::Connected,
        });
    }

    fn on_message(&self, kind: ChannelKind, id: ConnectionId, text: String) {
        let handler = {
            let channels = self.lock_channels();
            let state = channels.get(kind);
            if !state.is_current(id) {
                return;
            }
            state.handler.clone()
        };

        let message = InboundMessage::parse(text);
        match handler {
            Some(handler) => handler(message),
            None => debug!(channel = %kind, "No handler registered; message dropped"),
        }
    }

    fn on_close(self: &Arc<Self>, kind: ChannelKind, id: ConnectionId, code: u16, reason: String) {
        let intentional = {
            let mut channels = self.lock_channels();
            let state = channels.get_mut(kind);
            if !state.is_current(id) {
                debug!(channel = %kind, connection = id, code, "Ignoring close from superseded transport");
                return;
            }
            // Heartbeat stops before any reconnect decision.
            self.stop_heartbeat(state);
            state.transport = None;
            state.intentionally_closed
        };

        self.events.publish(ClientEvent::StatusChanged {
            channel: kind,
            status: ChannelStatus::Disconnected,
        });

        if intentional {
            info!(channel = %kind, code, "Channel closed by client");
            return;
        }

        if kind == ChannelKind::User && code == CREDENTIAL_EXPIRED {
            info!(channel = %kind, reason = %reason, "Credential expired; refreshing");
            let shared = Arc::clone(self);
            tokio::spawn(async move {
                let outcome = shared.credentials.refresh().await;
                shared.on_refresh_complete(kind, outcome);
            });
            return;
        }

        warn!(channel = %kind, code, reason = %reason, "Channel closed unexpectedly");
        self.schedule_reconnect(kind, None);
    }

    pub(crate) fn on_refresh_complete(
        self: &Arc<Self>,
        kind: ChannelKind,
        outcome: Result<Credential, RefreshError>,
    ) {
        {
            let mut channels = self.lock_channels();
            let state = channels.get_mut(kind);
            if !state.awaiting_recovery() {
                debug!(channel = %kind, "Channel no longer waiting on refresh; result discarded");
                return;
            }
            if outcome.is_ok() {
                state.attempt = 0;
            }
        }

        match outcome {
            Ok(_) => {
                info!(channel = %kind, "Reconnecting with refreshed credential");
                self.connect_channel(kind);
            }
            Err(e) => {
                warn!(channel = %kind, error = %e, "Refresh failed; retrying with current credential");
                self.schedule_reconnect(kind, None);
            }
        }
    }
}
