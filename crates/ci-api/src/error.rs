//! Error types for the REST layer

use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::ConfigError;

/// Result type for REST operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors raised by [`crate::ApiClient`]
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection error, timeout)
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a status outside the expected set
    #[error("{method} {url} returned {status} (expected {expected}): {body}")]
    UnexpectedStatus {
        method: Method,
        url: String,
        status: StatusCode,
        expected: String,
        body: String,
    },

    /// A request body could not be serialized
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    /// Status code of an unexpected response, if that is what this is
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the request timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport { source, .. } if source.is_timeout())
    }
}
