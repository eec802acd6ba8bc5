//! Error types for the rds CLI

use thiserror::Error;

/// Result type alias for rds operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    /// No instance matched, no history, or the remembered instance is gone
    #[error("{0}")]
    NotFound(String),

    #[error("Selection cancelled")]
    Cancelled,

    #[error("Failed to fetch secret '{secret}' in {region}: {reason}")]
    CredentialFetchFailed {
        secret: String,
        region: String,
        reason: String,
    },

    #[error("Failed to load AWS config: {0}")]
    ConfigLoadFailed(String),

    #[error("Failed to fetch RDS instances: {0}")]
    Discovery(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Failed to launch client: {0}")]
    Launch(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Local cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Could not determine home directory for the cache")]
    NoHome,

    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Cache serialization error: {0}")]
    Serialize(String),
}
