//! Credentials and the single-flight refresh coordinator.

mod coordinator;
mod http;
mod types;

pub use coordinator::CredentialRefreshCoordinator;
pub use http::HttpCredentialSource;
pub use types::{refresh_fn, Credential, CredentialSource, FnCredentialSource, NoRefresh, RefreshError};
