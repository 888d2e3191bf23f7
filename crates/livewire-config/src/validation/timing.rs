//! Validation for reconnect, heartbeat, and transport timings.

use crate::schema::LivewireConfig;

use super::helpers::{validate_range, validate_range_ms};

/// Validate reconnect constraints.
pub(crate) fn validate_reconnect(errors: &mut Vec<String>, config: &LivewireConfig) {
    let reconnect = &config.reconnect;
    validate_range(
        errors,
        "reconnect.max_attempts",
        reconnect.max_attempts,
        0,
        1000,
    );
    validate_range_ms(
        errors,
        "reconnect.base_interval_ms",
        reconnect.base_interval_ms,
        100,
        60_000,
    );
    validate_range_ms(
        errors,
        "reconnect.max_interval_ms",
        reconnect.max_interval_ms,
        1000,
        600_000,
    );
    if reconnect.base_interval_ms > reconnect.max_interval_ms {
        errors.push(format!(
            "reconnect.base_interval_ms = {} exceeds reconnect.max_interval_ms = {}",
            reconnect.base_interval_ms, reconnect.max_interval_ms
        ));
    }
}

/// Validate heartbeat constraints.
pub(crate) fn validate_heartbeat(errors: &mut Vec<String>, config: &LivewireConfig) {
    validate_range_ms(
        errors,
        "heartbeat.ping_interval_ms",
        config.heartbeat.ping_interval_ms,
        1000,
        600_000,
    );
}

/// Validate transport constraints.
pub(crate) fn validate_transport(errors: &mut Vec<String>, config: &LivewireConfig) {
    validate_range_ms(
        errors,
        "transport.connect_timeout_ms",
        config.transport.connect_timeout_ms,
        1000,
        120_000,
    );
}
