//! Error types for the monitor sync tool
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for sync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the monitor sync tool
#[derive(Error, Debug)]
pub enum Error {
    /// Desired-state source errors (Traefik/Docker fetch failures)
    #[error("Source error: {0}")]
    Source(String),

    /// Monitor service errors (Uptime Kuma API failures)
    #[error("Monitor service error: {0}")]
    Service(String),

    /// Authentication failed with the stored credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The authenticated session is no longer valid
    ///
    /// This variant triggers the session manager's re-login-and-retry path.
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A referenced remote object does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a source error
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a monitor service error
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a session-expired error
    pub fn session_expired(msg: impl Into<String>) -> Self {
        Self::SessionExpired(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether this error indicates an expired session
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }

    /// Whether this error indicates a duplicate-create conflict
    ///
    /// The tag resolver treats a duplicate-create as "already exists"
    /// and resolves the id by re-querying.
    pub fn is_duplicate(&self) -> bool {
        match self {
            Self::Service(msg) => {
                let msg = msg.to_lowercase();
                msg.contains("duplicate") || msg.contains("already exists") || msg.contains("unique")
            }
            _ => false,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
