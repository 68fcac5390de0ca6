use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid whitelist pattern '{pattern}': {message}")]
    Filter { pattern: String, message: String },

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Timeout error: operation took longer than {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Parse error: {message}")]
    Parse { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for relay operations
pub type Result<T> = std::result::Result<T, RelayError>;

impl RelayError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new sink error
    pub fn sink<S: Into<String>>(msg: S) -> Self {
        Self::Sink(msg.into())
    }

    /// Creates a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Creates a new parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Returns true if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Timeout { .. } => true,
            Self::Http(err) => {
                err.is_timeout()
                    || err.is_connect()
                    || err.status().is_some_and(|status| status.is_server_error())
            },
            _ => false,
        }
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Filter { .. } => "filter",
            Self::Sink(_) => "sink",
            Self::Network(_) | Self::Http(_) => "network",
            Self::Timeout { .. } => "timeout",
            Self::Parse { .. } | Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = RelayError::sink("collector rejected batch");
        assert_eq!(err.to_string(), "Sink error: collector rejected batch");
        assert_eq!(err.category(), "sink");
    }

    #[test]
    fn test_error_recoverability() {
        assert!(RelayError::network("connection refused").is_recoverable());
        assert!(!RelayError::config("missing whitelist").is_recoverable());
        assert!(!RelayError::sink("HTTP 400").is_recoverable());
        assert!(RelayError::Timeout { timeout_ms: 5000 }.is_recoverable());
    }

    #[test]
    fn test_filter_error_message() {
        let err = RelayError::Filter {
            pattern: "kafka.(".to_string(),
            message: "unclosed group".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid whitelist pattern 'kafka.(': unclosed group");
        assert_eq!(err.category(), "filter");
    }
}
