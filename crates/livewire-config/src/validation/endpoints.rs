//! Validation for endpoint URLs and the refresh endpoint.

use crate::schema::LivewireConfig;

fn is_websocket_url(url: &str) -> bool {
    url.starts_with("ws://") || url.starts_with("wss://")
}

/// Both channel URLs must be WebSocket URLs and the token parameter non-empty.
pub(crate) fn validate_endpoints(errors: &mut Vec<String>, config: &LivewireConfig) {
    let endpoints = &config.endpoints;
    if !is_websocket_url(&endpoints.broadcast_url) {
        errors.push(format!(
            "endpoints.broadcast_url = {:?} must start with ws:// or wss://",
            endpoints.broadcast_url
        ));
    }
    if !is_websocket_url(&endpoints.user_url) {
        errors.push(format!(
            "endpoints.user_url = {:?} must start with ws:// or wss://",
            endpoints.user_url
        ));
    }
    if endpoints.token_param.trim().is_empty() {
        errors.push("endpoints.token_param must not be empty".into());
    }
}

/// The refresh endpoint, when set, must be an HTTP URL.
pub(crate) fn validate_auth(errors: &mut Vec<String>, config: &LivewireConfig) {
    if let Some(url) = &config.auth.refresh_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!(
                "auth.refresh_url = {url:?} must start with http:// or https://"
            ));
        }
    }
}
