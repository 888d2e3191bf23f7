//! WebSocket transport over `tokio-tungstenite`.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use livewire_common::TransportError;
use livewire_config::TransportConfig;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use super::types::{
    redact_target, EventSink, ReadyState, Transport, TransportEvent, TransportFactory,
    ABNORMAL_CLOSURE, NORMAL_CLOSURE, NO_STATUS,
};

/// How long to wait for the peer to finish the closing handshake.
const CLOSE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

const CONNECTING: u8 = 0;
const OPEN: u8 = 1;
const CLOSING: u8 = 2;
const CLOSED: u8 = 3;

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Opens one background socket task per transport.
#[derive(Debug, Clone)]
pub struct WsTransportFactory {
    connect_timeout: Duration,
}

impl WsTransportFactory {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }

    pub fn from_config(config: &TransportConfig) -> Self {
        Self::new(Duration::from_millis(config.connect_timeout_ms))
    }
}

impl Default for WsTransportFactory {
    fn default() -> Self {
        Self::from_config(&TransportConfig::default())
    }
}

impl TransportFactory for WsTransportFactory {
    fn open(&self, target: &str, events: EventSink) -> Arc<dyn Transport> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let state = Arc::new(AtomicU8::new(CONNECTING));

        tokio::spawn(socket_task(
            target.to_string(),
            self.connect_timeout,
            Arc::clone(&state),
            command_rx,
            events,
        ));

        Arc::new(WsTransport { state, command_tx })
    }
}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Command {
    Send(String),
    Close { code: u16, reason: String },
}

struct WsTransport {
    state: Arc<AtomicU8>,
    command_tx: mpsc::UnboundedSender<Command>,
}

impl Transport for WsTransport {
    fn ready_state(&self) -> ReadyState {
        match self.state.load(Ordering::Acquire) {
            CONNECTING => ReadyState::Connecting,
            OPEN => ReadyState::Open,
            CLOSING => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }

    fn send(&self, frame: String) -> Result<(), TransportError> {
        if !self.is_open() {
            return Err(TransportError::NotOpen);
        }
        self.command_tx
            .send(Command::Send(frame))
            .map_err(|_| TransportError::Closed)
    }

    fn close(&self, code: u16, reason: &str) {
        let previous = self.state.swap(CLOSING, Ordering::AcqRel);
        if previous == CLOSED {
            self.state.store(CLOSED, Ordering::Release);
            return;
        }
        if previous == CLOSING {
            return;
        }
        let _ = self.command_tx.send(Command::Close {
            code,
            reason: reason.to_string(),
        });
    }
}

// ---------------------------------------------------------------------------
// Socket Task
// ---------------------------------------------------------------------------

fn fail_connect(state: &AtomicU8, events: &EventSink, error: TransportError) {
    state.store(CLOSED, Ordering::Release);
    let reason = error.to_string();
    events.emit(TransportEvent::Error(reason.clone()));
    events.emit(TransportEvent::Closed {
        code: ABNORMAL_CLOSURE,
        reason,
    });
}

async fn socket_task(
    target: String,
    connect_timeout: Duration,
    state: Arc<AtomicU8>,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    events: EventSink,
) {
    debug!(url = %redact_target(&target), "Opening WebSocket");

    let ws_stream =
        match tokio::time::timeout(connect_timeout, tokio_tungstenite::connect_async(&target))
            .await
        {
            Ok(Ok((ws_stream, _))) => ws_stream,
            Ok(Err(e)) => {
                warn!(url = %redact_target(&target), error = %e, "WebSocket connect failed");
                fail_connect(&state, &events, TransportError::Connect(e.to_string()));
                return;
            }
            Err(_elapsed) => {
                warn!(
                    url = %redact_target(&target),
                    timeout_ms = connect_timeout.as_millis() as u64,
                    "WebSocket connect timed out"
                );
                fail_connect(&state, &events, TransportError::Connect("timed out".into()));
                return;
            }
        };

    // A close requested while connecting leaves the state at CLOSING; the
    // queued Close command is handled below without announcing Opened.
    if state
        .compare_exchange(CONNECTING, OPEN, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
    {
        info!(url = %redact_target(&target), "WebSocket open");
        events.emit(TransportEvent::Opened);
    }

    let (mut ws_write, mut ws_read) = ws_stream.split();
    let mut requested: Option<(u16, String)> = None;

    let (code, reason) = loop {
        tokio::select! {
            command = command_rx.recv(), if requested.is_none() => match command {
                Some(Command::Send(text)) => {
                    if let Err(e) = ws_write.send(WsMessage::Text(text.into())).await {
                        warn!(error = %e, "WebSocket send failed");
                        events.emit(TransportEvent::Error(e.to_string()));
                        break (ABNORMAL_CLOSURE, e.to_string());
                    }
                }
                Some(Command::Close { code, reason }) => {
                    let frame = CloseFrame {
                        code: CloseCode::from(code),
                        reason: reason.clone().into(),
                    };
                    if ws_write.send(WsMessage::Close(Some(frame))).await.is_err() {
                        break (code, reason);
                    }
                    requested = Some((code, reason));
                }
                None => {
                    // Every handle is gone; nobody can observe further events.
                    let _ = ws_write.send(WsMessage::Close(None)).await;
                    break (NORMAL_CLOSURE, String::new());
                }
            },
            incoming = ws_read.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    events.emit(TransportEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(WsMessage::Binary(bytes))) => {
                    events.emit(TransportEvent::Message(
                        String::from_utf8_lossy(&bytes).into_owned(),
                    ));
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    // Flush our echo and let the peer drop the connection.
                    let drain = async {
                        let _ = ws_write.flush().await;
                        while let Some(Ok(_)) = ws_read.next().await {}
                    };
                    if tokio::time::timeout(CLOSE_HANDSHAKE_TIMEOUT, drain).await.is_err() {
                        debug!("Peer did not finish the closing handshake");
                    }
                    break match frame {
                        Some(frame) => (u16::from(frame.code), frame.reason.as_str().to_owned()),
                        None => requested.clone().unwrap_or((NO_STATUS, String::new())),
                    };
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    if let Some(requested) = requested.clone() {
                        break requested;
                    }
                    warn!(error = %e, "WebSocket error");
                    events.emit(TransportEvent::Error(e.to_string()));
                    break (ABNORMAL_CLOSURE, e.to_string());
                }
                None => {
                    break requested
                        .clone()
                        .unwrap_or((ABNORMAL_CLOSURE, "connection lost".into()));
                }
            },
        }
    };

    state.store(CLOSED, Ordering::Release);
    info!(url = %redact_target(&target), code, reason = %reason, "WebSocket closed");
    events.emit(TransportEvent::Closed { code, reason });
}
