//! Error types for the verification engine

use thiserror::Error;

/// Result type alias for verification operations
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Main error type for verification operations
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Failed to parse {0}")]
    ParseError(String),

    #[error("Network error: {0}")]
    NetworkError(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("API error from {service}: {message}")]
    ApiError { service: String, message: String },

    #[error("Rate limit exceeded for {service}. Retry after: {retry_after:?}")]
    RateLimitExceeded {
        service: String,
        retry_after: Option<std::time::Duration>,
    },

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Data unavailable: {0}")]
    Unavailable(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

#[derive(Debug)]
struct StringError(String);

impl std::fmt::Display for StringError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StringError {}

impl VerifyError {
    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(Box::new(StringError(msg.into())))
    }

    /// Create an API error
    pub fn api(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ApiError {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn unavailable(what: impl Into<String>) -> Self {
        Self::Unavailable(what.into())
    }

    pub fn not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound(identifier.into())
    }

    /// Whether this error means the repository itself could not be located
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
