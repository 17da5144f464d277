//! Error types for Guardian

/// Result type alias using Guardian's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for Guardian operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid caller input (request bodies, CLI arguments)
    #[error("{0}")]
    Validation(String),

    /// Missing or unusable configuration
    #[error("{0}")]
    Config(String),

    /// Failures of external dependencies (YouTube API, URL parsing)
    #[error("{0}")]
    Upstream(String),

    /// Model loading or inference errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new upstream error
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether the error was caused by the caller rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Upstream(_))
    }
}
