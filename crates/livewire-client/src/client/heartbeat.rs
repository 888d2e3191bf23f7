//! Periodic liveness pings on open channels.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::channel::ChannelKind;
use crate::message::ping_frame;

use super::state::{ConnectionId, ConnectionState};
use super::Shared;

impl Shared {
    /// Replace any heartbeat on `kind` with one bound to connection `id`.
    pub(crate) fn start_heartbeat(self: &Arc<Self>, kind: ChannelKind, id: ConnectionId) {
        let mut channels = self.lock_channels();
        let state = channels.get_mut(kind);
        self.stop_heartbeat(state);
        if !state.is_current(id) {
            return;
        }

        let shared = Arc::downgrade(self);
        let timer = self.scheduler.schedule_repeating(
            self.settings.ping_interval,
            Box::new(move |_| {
                if let Some(shared) = shared.upgrade() {
                    shared.send_ping(kind, id);
                }
            }),
        );
        state.heartbeat_timer = Some(timer);
        debug!(channel = %kind, connection = id, "Heartbeat started");
    }

    /// Cancel the heartbeat of a channel whose state the caller has locked.
    pub(crate) fn stop_heartbeat(&self, state: &mut ConnectionState) {
        if let Some(timer) = state.heartbeat_timer.take() {
            self.scheduler.cancel(timer);
        }
    }

    /// Send one ping if connection `id` is still current and open.
    fn send_ping(&self, kind: ChannelKind, id: ConnectionId) {
        let transport = {
            let channels = self.lock_channels();
            match &channels.get(kind).transport {
                Some(active) if active.id == id && active.handle.is_open() => {
                    Arc::clone(&active.handle)
                }
                _ => {
                    trace!(channel = %kind, "Transport not open; skipping ping");
                    return;
                }
            }
        };

        if let Err(e) = transport.send(ping_frame()) {
            debug!(channel = %kind, error = %e, "Ping not sent");
        }
    }
}
