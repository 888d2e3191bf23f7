//! Transport trait, lifecycle events, and close codes.

use std::fmt;
use std::sync::Arc;

use livewire_common::TransportError;

// ---------------------------------------------------------------------------
// Close Codes
// ---------------------------------------------------------------------------

/// Client-initiated intentional close.
pub const NORMAL_CLOSURE: u16 = 1000;
/// Close frame carried no status code.
pub const NO_STATUS: u16 = 1005;
/// Connection dropped without a close frame.
pub const ABNORMAL_CLOSURE: u16 = 1006;
/// Server signal on the user channel that the credential has expired.
pub const CREDENTIAL_EXPIRED: u16 = 4001;

/// Target with its query string removed, for logging.
pub(crate) fn redact_target(target: &str) -> &str {
    target.split('?').next().unwrap_or("")
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Readiness of a transport handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Lifecycle events reported by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Message(String),
    Error(String),
    Closed { code: u16, reason: String },
}

/// Callback a transport reports its events through.
#[derive(Clone)]
pub struct EventSink(Arc<dyn Fn(TransportEvent) + Send + Sync>);

impl EventSink {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(TransportEvent) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn emit(&self, event: TransportEvent) {
        (self.0)(event)
    }
}

impl fmt::Debug for EventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EventSink")
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A live, message-oriented connection.
pub trait Transport: Send + Sync {
    fn ready_state(&self) -> ReadyState;

    fn is_open(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    /// Queue a text frame. Fails unless the transport is open.
    fn send(&self, frame: String) -> Result<(), TransportError>;

    /// Start the closing handshake. A `Closed` event follows.
    fn close(&self, code: u16, reason: &str);
}

/// Opens transports to a target.
///
/// `open` returns immediately with a handle in the `Connecting` state and
/// reports progress through `events`. Implementations must not emit events
/// from inside `open` itself.
pub trait TransportFactory: Send + Sync {
    fn open(&self, target: &str, events: EventSink) -> Arc<dyn Transport>;
}
