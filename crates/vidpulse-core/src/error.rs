//! Error types for VidPulse

/// Result type alias using VidPulse's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for VidPulse operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required model artifacts are not loaded
    #[error("models not loaded: {0}")]
    Unavailable(String),

    /// Classifier execution errors (vectorize/predict)
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Upstream API errors (YouTube Data API, inference endpoint)
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Network/IO errors
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
    /// Create a new unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new upstream error
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
