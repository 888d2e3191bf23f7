//! Credential refresh configuration.

use serde::{Deserialize, Serialize};

/// Upstream token refresh endpoint.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HTTP endpoint that issues a fresh access token. Refresh is
    /// disabled when unset.
    pub refresh_url: Option<String>,
    /// Long-lived refresh token sent in the request body, if the server
    /// wants one.
    pub refresh_token: Option<String>,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("refresh_url", &self.refresh_url)
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
