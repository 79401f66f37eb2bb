//! Error types for the Lumen gateway

use thiserror::Error;

/// Result type alias for Lumen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Lumen gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio capture error
    #[error("audio error: {0}")]
    Audio(String),

    /// Intent prediction error
    #[error("NLU error: {0}")]
    Nlu(String),

    /// Secret store error
    #[error("vault error: {0}")]
    Vault(String),

    /// Device dispatch error
    #[error("device error: {0}")]
    Device(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
