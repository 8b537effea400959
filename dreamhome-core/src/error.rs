//! Error types for store access and id allocation

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The connection manager is not in the Connected state, or the handle
    /// used belongs to an earlier connection.
    #[error("not connected to the document store")]
    NotConnected,

    #[error("a connection attempt is already in progress")]
    ConnectInProgress,

    #[error("failed to connect to {endpoint}: {reason}")]
    ConnectFailed { endpoint: String, reason: String },

    /// The store could not perform the atomic increment. Retryable.
    #[error("counter '{key}' could not be incremented: {reason}")]
    AllocationConflict { key: String, reason: String },

    /// Transient I/O failure on an otherwise connected session.
    #[error("document store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("invalid counter key: {0:?}")]
    InvalidKey(String),

    #[error("invalid counter settings: {0}")]
    InvalidSettings(String),

    /// The counter reached the largest representable id. The stored value is
    /// left as it was.
    #[error("counter '{key}' has no ids left")]
    CounterExhausted { key: String },

    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Stable machine-readable name, used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConnected => "not_connected",
            Self::ConnectInProgress => "connect_in_progress",
            Self::ConnectFailed { .. } => "connect_failed",
            Self::AllocationConflict { .. } => "allocation_conflict",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::NotFound { .. } => "not_found",
            Self::InvalidKey(_) => "invalid_key",
            Self::InvalidSettings(_) => "invalid_settings",
            Self::CounterExhausted { .. } => "counter_exhausted",
            Self::Document(_) => "document_error",
            Self::Backend(_) => "database_error",
        }
    }

    /// True for errors that mean the store cannot be reached right now.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::ConnectInProgress
                | Self::ConnectFailed { .. }
                | Self::StoreUnavailable(_)
        )
    }
}
