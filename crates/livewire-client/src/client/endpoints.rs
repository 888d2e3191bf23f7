//! Connection targets for both channels.

use livewire_common::LivewireError;
use livewire_config::EndpointsConfig;
use tracing::warn;
use url::Url;

use crate::channel::ChannelKind;
use crate::credentials::Credential;

#[derive(Debug, Clone)]
pub(crate) struct Endpoints {
    broadcast: Url,
    user: Url,
    token_param: String,
}

fn parse(name: &str, raw: &str) -> Result<Url, LivewireError> {
    let url = Url::parse(raw).map_err(|e| LivewireError::Url(format!("{name} {raw:?}: {e}")))?;
    match url.scheme() {
        "ws" | "wss" => Ok(url),
        other => Err(LivewireError::Url(format!(
            "{name} {raw:?}: unsupported scheme {other:?}"
        ))),
    }
}

impl Endpoints {
    pub(crate) fn from_config(config: &EndpointsConfig) -> Result<Self, LivewireError> {
        Ok(Self {
            broadcast: parse("endpoints.broadcast_url", &config.broadcast_url)?,
            user: parse("endpoints.user_url", &config.user_url)?,
            token_param: config.token_param.clone(),
        })
    }

    /// Target for `kind`; the user target carries `credential` in its query.
    pub(crate) fn target(&self, kind: ChannelKind, credential: &Credential) -> String {
        let mut url = match kind {
            ChannelKind::Broadcast => self.broadcast.clone(),
            ChannelKind::User => self.user.clone(),
        };
        if kind.requires_credential() {
            if credential.is_empty() {
                warn!(channel = %kind, "No credential set; the server will likely reject it");
            }
            url.query_pairs_mut()
                .append_pair(&self.token_param, credential.as_str());
        }
        url.to_string()
    }
}
