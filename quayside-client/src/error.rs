//! Error types for the quayside-client crate.
//!
//! All provider-specific failure shapes are normalized here: workflow code
//! asks [`Error::is_transition_invalid`] instead of matching on HTTP
//! statuses or wire codes.

use std::result;

use quayside_api::{ApiErrorResponse, ErrorCode};
use thiserror::Error;

/// Errors surfaced by marketplace API calls.
#[derive(Debug, Error)]
pub enum Error {
    /// The API rejected the request with an error payload.
    #[error("API request rejected with status {status}")]
    Api {
        /// HTTP status of the response.
        status: u16,
        /// Parsed error envelope, empty when the body was unreadable.
        body: ApiErrorResponse,
    },

    /// The request could not be delivered or the response could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// A payload could not be serialized or deserialized.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The client configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Custom Result type for marketplace client operations.
pub type Result<T> = result::Result<T, Error>;

impl Error {
    /// HTTP status of an API rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Leading error code of an API rejection, if this is one.
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            Error::Api { body, .. } => body.code(),
            _ => None,
        }
    }

    /// Whether this is the 409 rejection raised when a requested transition
    /// is not valid in the transaction's current state.
    pub fn is_transition_invalid(&self) -> bool {
        matches!(
            self,
            Error::Api { status: 409, body } if body.has_code(&ErrorCode::TransactionInvalidTransition)
        )
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else if err.is_decode() {
            Error::Serialization(err.to_string())
        } else {
            Error::Transport(err.to_string())
        }
    }
}
