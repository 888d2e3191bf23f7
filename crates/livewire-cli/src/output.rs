//! Rendering of delivered messages as JSON lines.

use livewire_client::{ChannelKind, InboundMessage};
use serde_json::json;

/// One output line: `{"channel": "...", "message": ...}`. Raw text is
/// emitted as a JSON string.
pub fn render_line(kind: ChannelKind, message: &InboundMessage) -> String {
    json!({
        "channel": kind,
        "message": message.clone().into_value(),
    })
    .to_string()
}
