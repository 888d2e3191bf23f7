//! Assembly of a [`Client`] from config plus optional collaborators.

use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use livewire_config::{validation, LivewireConfig};
use tracing::debug;

use crate::credentials::{
    Credential, CredentialRefreshCoordinator, CredentialSource, HttpCredentialSource, NoRefresh,
};
use crate::events::EventBus;
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::transport::{TransportFactory, WsTransportFactory};

use super::endpoints::Endpoints;
use super::state::Channels;
use super::{Client, Settings, Shared};

const EVENT_CAPACITY: usize = 64;

/// Builder for [`Client`].
///
/// Defaults: WebSocket transports, tokio timers, and an HTTP credential
/// source when `auth.refresh_url` is set (otherwise refresh always fails).
pub struct ClientBuilder {
    config: LivewireConfig,
    credential: Credential,
    source: Option<Arc<dyn CredentialSource>>,
    transports: Option<Arc<dyn TransportFactory>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl ClientBuilder {
    pub fn new(config: &LivewireConfig, credential: Credential) -> Self {
        Self {
            config: config.clone(),
            credential,
            source: None,
            transports: None,
            scheduler: None,
        }
    }

    pub fn with_credential_source(mut self, source: Arc<dyn CredentialSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_transport_factory(mut self, factory: Arc<dyn TransportFactory>) -> Self {
        self.transports = Some(factory);
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn build(self) -> livewire_common::Result<Client> {
        validation::validate(&self.config)?;
        let endpoints = Endpoints::from_config(&self.config.endpoints)?;

        let settings = Settings {
            max_attempts: self.config.reconnect.max_attempts,
            base_interval: Duration::from_millis(self.config.reconnect.base_interval_ms),
            max_interval: Duration::from_millis(self.config.reconnect.max_interval_ms),
            ping_interval: Duration::from_millis(self.config.heartbeat.ping_interval_ms),
            log_targets: self.config.logging.log_targets,
        };

        let transports = self.transports.unwrap_or_else(|| {
            Arc::new(WsTransportFactory::from_config(&self.config.transport))
        });
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler::new()));
        let source: Arc<dyn CredentialSource> = match self.source {
            Some(source) => source,
            None => match HttpCredentialSource::from_config(&self.config.auth) {
                Some(http) => Arc::new(http),
                None => {
                    debug!("No refresh endpoint configured; credential refresh disabled");
                    Arc::new(NoRefresh)
                }
            },
        };

        let events = EventBus::new(EVENT_CAPACITY);
        let credentials = CredentialRefreshCoordinator::new(self.credential, source, events.clone());

        Ok(Client {
            shared: Arc::new(Shared {
                settings,
                endpoints,
                transports,
                scheduler,
                credentials,
                events,
                channels: Mutex::new(Channels::default()),
                next_connection: AtomicU64::new(0),
            }),
        })
    }
}
