//! Swappable message transport.
//!
//! The client only talks to [`TransportFactory`] and [`Transport`]; the
//! WebSocket implementation lives in [`websocket`], tests substitute a fake.

mod types;
pub mod websocket;

pub(crate) use types::redact_target;

pub use types::{
    EventSink, ReadyState, Transport, TransportEvent, TransportFactory, ABNORMAL_CLOSURE,
    CREDENTIAL_EXPIRED, NORMAL_CLOSURE, NO_STATUS,
};
pub use websocket::WsTransportFactory;
