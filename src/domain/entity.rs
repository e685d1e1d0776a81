//! Domain Layer - Core Entity Trait
//!
//! Every record kept in a replica store exposes its remote document id.
//! Records that have not been persisted yet have no id.

use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Clone + Send + Sync + 'static {
    /// Document id assigned by the remote store, if persisted
    fn id(&self) -> Option<&str>;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// Errors are `Clone` so a live feed can hand the same failure to every
/// listener.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),
    /// Malformed input caught at the boundary
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A feature is missing the configuration it depends on
    #[error("Configuration error: {0}")]
    Config(String),
    /// The remote side is reachable but not set up for the request
    #[error("Setup required: {0}")]
    Setup(String),
    /// Connectivity or server failure
    #[error("Remote error{}: {message}", .status.map(|s| format!(" {}", s)).unwrap_or_default())]
    Remote { status: Option<u16>, message: String },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn remote(message: impl Into<String>) -> Self {
        DomainError::Remote {
            status: None,
            message: message.into(),
        }
    }

    pub fn remote_status(status: u16, message: impl Into<String>) -> Self {
        DomainError::Remote {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Internal(format!("serialization: {}", e))
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        DomainError::Remote {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}
