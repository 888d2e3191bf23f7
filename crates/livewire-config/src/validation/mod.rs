//! Full configuration validation.
//!
//! Each domain has its own submodule; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod endpoints;
mod helpers;
mod timing;


use crate::schema::LivewireConfig;
use livewire_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &LivewireConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    endpoints::validate_endpoints(&mut errors, config);
    endpoints::validate_auth(&mut errors, config);
    timing::validate_reconnect(&mut errors, config);
    timing::validate_heartbeat(&mut errors, config);
    timing::validate_transport(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
