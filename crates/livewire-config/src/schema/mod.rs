//! Configuration schema types for Livewire.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod auth;
mod endpoints;
mod system;
mod timing;

pub use auth::*;
pub use endpoints::*;
pub use system::*;
pub use timing::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for a Livewire client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct LivewireConfig {
    pub endpoints: EndpointsConfig,
    pub reconnect: ReconnectConfig,
    pub heartbeat: HeartbeatConfig,
    pub transport: TransportConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

// =============================================================================
// Tests
// =============================================================================
