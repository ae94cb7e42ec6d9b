//! Error types for fetching course pages.

use thiserror::Error;

use crate::db::StoreError;

/// Errors surfaced to the UI when a page cannot be shown.
#[derive(Debug, Error, Clone)]
pub enum ClientError {
    /// The request never produced a response
    #[error("Network error: {message}")]
    Network { message: String },

    /// The service answered with a failure status
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body does not have the expected shape
    #[error("Invalid response: {message}")]
    Validation { message: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::Network {
            message: format!("invalid service url: {err}"),
        }
    }
}

impl From<StoreError> for ClientError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation { message } => ClientError::Validation { message },
            other => ClientError::Network {
                message: other.to_string(),
            },
        }
    }
}
