//! Dual-channel realtime client.
//!
//! Keeps a public broadcast channel and an authenticated per-user channel
//! open over WebSocket. Each channel reconnects with exponential backoff,
//! sends liveness pings, and the user channel refreshes its credential
//! (single-flight) when the server reports it expired.

pub mod channel;
pub mod client;
pub mod credentials;
pub mod events;
pub mod message;
pub mod scheduler;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use channel::{ChannelKind, ChannelStatus};
pub use client::{Client, ClientBuilder, MessageHandler};
pub use credentials::{
    refresh_fn, Credential, CredentialRefreshCoordinator, CredentialSource, FnCredentialSource,
    HttpCredentialSource, NoRefresh, RefreshError,
};
pub use events::{ClientEvent, EventBus};
pub use message::InboundMessage;
pub use scheduler::{Scheduler, TimerId, TokioScheduler};
pub use transport::{
    EventSink, ReadyState, Transport, TransportEvent, TransportFactory, WsTransportFactory,
};
