pub mod errors;

pub use errors::{ConfigError, LivewireError, TransportError};

pub type Result<T> = std::result::Result<T, LivewireError>;
