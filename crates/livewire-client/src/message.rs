//! Inbound frame decoding and the outbound heartbeat frame.

use serde_json::Value;

/// A message delivered to a channel handler.
///
/// Frames are expected to be JSON. Anything that does not decode is
/// delivered verbatim as [`InboundMessage::Raw`].
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Json(Value),
    Raw(String),
}

impl InboundMessage {
    /// Decode a text frame, falling back to the raw text.
    pub fn parse(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => InboundMessage::Json(value),
            Err(e) => {
                tracing::debug!(error = %e, "Inbound frame is not JSON; delivering raw text");
                InboundMessage::Raw(text)
            }
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            InboundMessage::Json(value) => Some(value),
            InboundMessage::Raw(_) => None,
        }
    }

    /// Convert into a JSON value; raw text becomes a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            InboundMessage::Json(value) => value,
            InboundMessage::Raw(text) => Value::String(text),
        }
    }
}

/// The liveness frame sent on every heartbeat tick.
pub(crate) fn ping_frame() -> String {
    serde_json::json!({ "type": "ping" }).to_string()
}
