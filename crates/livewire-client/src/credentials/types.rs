//! Credential value, refresh errors, and the upstream refresh trait.

use std::fmt;
use std::future::Future;

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// Opaque access token for the user channel.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential([REDACTED])")
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a refresh produced no credential. Cloned to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshError {
    #[error("refresh rejected: {0}")]
    Rejected(String),

    #[error("no credential source configured")]
    Unavailable,

    #[error("refresh ended without a result")]
    Abandoned,
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Upstream call that issues a fresh credential.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn refresh(&self) -> Result<Credential, RefreshError>;
}

/// Adapter turning an async closure into a [`CredentialSource`].
pub struct FnCredentialSource<F>(F);

/// Wrap an async closure as a [`CredentialSource`].
pub fn refresh_fn<F, Fut>(f: F) -> FnCredentialSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Credential, RefreshError>> + Send,
{
    FnCredentialSource(f)
}

#[async_trait]
impl<F, Fut> CredentialSource for FnCredentialSource<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<Credential, RefreshError>> + Send,
{
    async fn refresh(&self) -> Result<Credential, RefreshError> {
        (self.0)().await
    }
}

/// Source for deployments without a refresh endpoint; always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRefresh;

#[async_trait]
impl CredentialSource for NoRefresh {
    async fn refresh(&self) -> Result<Credential, RefreshError> {
        Err(RefreshError::Unavailable)
    }
}
