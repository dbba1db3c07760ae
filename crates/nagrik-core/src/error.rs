//! Error types for nagrik-core

use thiserror::Error;

use crate::sync::DeliveryError;

/// Result type alias using nagrik-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nagrik-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Durable storage failed (engine error, IO, quota, closed store)
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Remote reporting endpoint unreachable or rejected a report
    #[error("Delivery failure: {0}")]
    Delivery(#[from] DeliveryError),

    /// Location was unavailable or out of range
    #[error("Location unavailable: {0}")]
    Geolocation(String),

    /// A photo or voice note could not be read
    #[error("Media access failed: {0}")]
    MediaAccess(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this error came from the durable store.
    pub const fn is_storage_failure(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

impl From<libsql::Error> for Error {
    fn from(error: libsql::Error) -> Self {
        Self::Storage(error.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Storage(error.to_string())
    }
}
