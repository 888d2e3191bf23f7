//! The dual-channel client.
//!
//! [`Client`] owns the broadcast and user channels. All mutable state sits
//! behind one lock in [`Shared`], which is never held while a transport is
//! sent to, a transport is closed, or a message handler runs.

mod builder;
mod connector;
mod endpoints;
mod heartbeat;
mod reconnect;
mod state;


use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::info;

use crate::channel::{ChannelKind, ChannelStatus};
use crate::credentials::{Credential, CredentialRefreshCoordinator, RefreshError};
use crate::events::{ClientEvent, EventBus};
use crate::message::InboundMessage;
use crate::scheduler::Scheduler;
use crate::transport::TransportFactory;

pub use builder::ClientBuilder;
pub use state::MessageHandler;

use endpoints::Endpoints;
use state::Channels;

const DISCONNECT_REASON: &str = "Client disconnect";

/// Timing knobs resolved from config.
#[derive(Debug, Clone)]
pub(crate) struct Settings {
    pub(crate) max_attempts: u32,
    pub(crate) base_interval: Duration,
    pub(crate) max_interval: Duration,
    pub(crate) ping_interval: Duration,
    pub(crate) log_targets: bool,
}

pub(crate) struct Shared {
    pub(crate) settings: Settings,
    pub(crate) endpoints: Endpoints,
    pub(crate) transports: Arc<dyn TransportFactory>,
    pub(crate) scheduler: Arc<dyn Scheduler>,
    pub(crate) credentials: CredentialRefreshCoordinator,
    pub(crate) events: EventBus,
    pub(crate) channels: Mutex<Channels>,
    pub(crate) next_connection: AtomicU64,
}

impl Shared {
    pub(crate) fn lock_channels(&self) -> MutexGuard<'_, Channels> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to both realtime channels. Cheap to clone.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
}

impl Client {
    /// Start building a client from `config` with `credential` as the
    /// initial user credential.
    pub fn builder(config: &livewire_config::LivewireConfig, credential: Credential) -> ClientBuilder {
        ClientBuilder::new(config, credential)
    }

    // -----------------------------------------------------------------------
    // Channels
    // -----------------------------------------------------------------------

    /// Open the broadcast channel, delivering every message to `handler`.
    ///
    /// Calling again replaces the handler and forces a fresh connection.
    pub fn connect_broadcast<F>(&self, handler: F)
    where
        F: Fn(InboundMessage) + Send + Sync + 'static,
    {
        self.connect(ChannelKind::Broadcast, Arc::new(handler));
    }

    /// Open the user channel using the current credential.
    pub fn connect_user<F>(&self, handler: F)
    where
        F: Fn(InboundMessage) + Send + Sync + 'static,
    {
        self.connect(ChannelKind::User, Arc::new(handler));
    }

    fn connect(&self, kind: ChannelKind, handler: MessageHandler) {
        {
            let mut channels = self.shared.lock_channels();
            let state = channels.get_mut(kind);
            state.handler = Some(handler);
            state.intentionally_closed = false;
            state.attempt = 0;
        }
        self.shared.connect_channel(kind);
    }

    /// Store a new credential. An active user channel is closed and reopened
    /// with it right away; the broadcast channel is untouched.
    pub fn update_token(&self, credential: Credential) {
        self.shared.credentials.replace(credential);

        let reopen = {
            let channels = self.shared.lock_channels();
            let state = channels.get(ChannelKind::User);
            state.transport.is_some() && !state.intentionally_closed
        };
        if reopen {
            info!(channel = %ChannelKind::User, "Credential updated; reopening channel");
            self.shared.connect_channel(ChannelKind::User);
        }
    }

    /// Close `kind` and stop reconnecting it. Safe to call repeatedly.
    pub fn disconnect(&self, kind: ChannelKind) {
        self.shared.disconnect_channel(kind, DISCONNECT_REASON);
    }

    /// Disconnect both channels and cancel every timer.
    pub fn close(&self) {
        for kind in ChannelKind::ALL {
            self.disconnect(kind);
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn status(&self, kind: ChannelKind) -> ChannelStatus {
        self.shared.lock_channels().get(kind).status()
    }

    pub fn is_connected(&self, kind: ChannelKind) -> bool {
        self.status(kind) == ChannelStatus::Connected
    }

    /// Reconnect attempts made since the channel last opened.
    pub fn attempt(&self, kind: ChannelKind) -> u32 {
        self.shared.lock_channels().get(kind).attempt
    }

    pub fn credential(&self) -> Credential {
        self.shared.credentials.current()
    }

    /// Refresh the credential through the shared coordinator. Concurrent
    /// callers share one upstream call.
    pub async fn refresh_credential(&self) -> Result<Credential, RefreshError> {
        self.shared.credentials.refresh().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.shared.events.subscribe()
    }
}
