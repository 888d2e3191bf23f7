use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("transport is not open")]
    NotOpen,

    #[error("transport closed")]
    Closed,

    #[error("connect failed: {0}")]
    Connect(String),
}

#[derive(Debug, thiserror::Error)]
pub enum LivewireError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid endpoint url: {0}")]
    Url(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ValidationError("reconnect.max_attempts = 5000".into());
        assert_eq!(
            err.to_string(),
            "config validation error: reconnect.max_attempts = 5000"
        );

        let err = ConfigError::Io {
            path: PathBuf::from("/etc/livewire/config.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "config file /etc/livewire/config.toml: denied");
    }

    #[test]
    fn transport_error_display() {
        assert_eq!(TransportError::NotOpen.to_string(), "transport is not open");
        assert_eq!(
            TransportError::Connect("refused".into()).to_string(),
            "connect failed: refused"
        );
    }

    #[test]
    fn livewire_error_from_config() {
        let err: LivewireError = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(err, LivewireError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }
}
