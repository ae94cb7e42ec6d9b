//! Error types for the course store.

use thiserror::Error;

use crate::schedule::ScheduleError;

/// Errors that can occur while reading the course store.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// The database could not be reached or rejected the query
    #[error("Store transport error: {message}")]
    Transport { message: String },

    /// A stored record does not have the expected shape
    #[error("Record validation failed: {message}")]
    Validation { message: String },

    /// The operation did not finish within the configured limit
    #[error("Store operation timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// The caller abandoned the operation before it reached the store
    #[error("Store operation cancelled")]
    Cancelled,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Transport {
            message: err.to_string(),
        }
    }
}

impl From<ScheduleError> for StoreError {
    fn from(err: ScheduleError) -> Self {
        StoreError::Validation {
            message: err.to_string(),
        }
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Transport {
            message: format!("store task failed: {err}"),
        }
    }
}
