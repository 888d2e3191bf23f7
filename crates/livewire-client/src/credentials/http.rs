//! Credential source that calls an HTTP token-refresh endpoint.

use async_trait::async_trait;
use livewire_config::AuthConfig;
use serde::Deserialize;
use tracing::debug;

use super::types::{Credential, CredentialSource, RefreshError};

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    #[serde(alias = "access_token", alias = "access")]
    token: String,
}

fn parse_response(body: &str) -> Result<Credential, RefreshError> {
    let response: RefreshResponse = serde_json::from_str(body)
        .map_err(|e| RefreshError::Rejected(format!("unexpected refresh response: {e}")))?;
    if response.token.is_empty() {
        return Err(RefreshError::Rejected("refresh response carried an empty token".into()));
    }
    Ok(Credential::new(response.token))
}

/// POSTs to a refresh endpoint and reads `token` (or `access_token` /
/// `access`) from the JSON reply.
pub struct HttpCredentialSource {
    http: reqwest::Client,
    url: String,
    refresh_token: Option<String>,
}

impl HttpCredentialSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
            refresh_token: None,
        }
    }

    /// Build from config; `None` when no refresh endpoint is configured.
    pub fn from_config(config: &AuthConfig) -> Option<Self> {
        let url = config.refresh_url.as_ref()?;
        let mut source = Self::new(url.clone());
        source.refresh_token = config.refresh_token.clone();
        Some(source)
    }
}

#[async_trait]
impl CredentialSource for HttpCredentialSource {
    async fn refresh(&self) -> Result<Credential, RefreshError> {
        debug!(url = %self.url, "Requesting credential refresh");
        let mut request = self.http.post(&self.url);
        if let Some(token) = &self.refresh_token {
            request = request.json(&serde_json::json!({ "refresh": token }));
        }

        let response = request
            .send()
            .await
            .map_err(|e| RefreshError::Rejected(format!("refresh request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RefreshError::Rejected(format!("refresh endpoint returned {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RefreshError::Rejected(format!("failed to read refresh response: {e}")))?;
        parse_response(&body)
    }
}
