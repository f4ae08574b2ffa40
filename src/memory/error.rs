//! Error types for the memory client.

use thiserror::Error;

/// Memory client error type.
#[derive(Error, Debug)]
pub enum Error {
    /// A required field was missing or blank; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// The remote API answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder when it could not be read.
        message: String,
    },

    /// Transport failure or undecodable response body.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification used by the session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caught before any network call.
    Validation,
    /// Anything that went wrong once a request was attempted.
    Fetch,
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Status { .. } | Self::Http(_) | Self::InvalidUrl(_) | Self::Json(_) => {
                ErrorKind::Fetch
            }
        }
    }

    /// HTTP status carried by the failure, if the remote answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for memory client operations.
pub type Result<T> = std::result::Result<T, Error>;
