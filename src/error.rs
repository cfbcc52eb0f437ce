//! Error types for the approval audit engine

use thiserror::Error;

/// Result type alias using our custom Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the audit and revocation engine
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Approval lookup errors
    #[error("Approval lookup failed: {0}")]
    Lookup(String),

    // Signer / revocation errors
    #[error("No wallet signer available: {0}")]
    SignerUnavailable(String),

    #[error("Request rejected by user: {0}")]
    UserRejected(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    // Cache errors
    #[error("Cache persistence failed: {0}")]
    CachePersistence(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Check if this error is a per-wallet lookup failure (recoverable at
    /// batch granularity)
    pub fn is_lookup(&self) -> bool {
        matches!(self, Error::Lookup(_))
    }

    /// Check if this error needs user action rather than a retry
    pub fn is_user_actionable(&self) -> bool {
        matches!(self, Error::SignerUnavailable(_) | Error::UserRejected(_))
    }
}

// Conversion from reqwest errors
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Lookup(e.to_string())
    }
}

// Conversion from serde_json errors
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

// Conversion from I/O errors
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}
