//! Client error types
//!
//! Unified error handling for the REST boundary and bus registration.

use crate::config::ConfigError;
use std::path::PathBuf;

/// Client-wide error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Transport errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP request failed with status {status}")]
    HttpFailed { status: u16 },

    // Caller errors
    #[error("Operation error: {0}")]
    Operation(String),

    #[error("Unsupported file type: {0}")]
    FileType(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Payload errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Setup errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Create a network error
    #[must_use]
    pub fn network(msg: impl std::fmt::Display) -> Self {
        Self::Network(msg.to_string())
    }

    /// Create an operation error
    #[must_use]
    pub fn operation(msg: impl std::fmt::Display) -> Self {
        Self::Operation(msg.to_string())
    }

    /// HTTP status code, if this error came from a non-2xx response
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpFailed { status } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is a network-class failure
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;
