//! Error handling for Quayside workflows

use thiserror::Error;

/// Error types for workflow operations
#[derive(Error, Debug)]
pub enum Error {
    /// A same-kind operation is already in flight; the attempt was refused
    /// before any request was issued
    #[error("Operation already in progress: {0}")]
    AlreadyPending(&'static str),

    /// A marketplace API call failed
    #[error("Marketplace client error: {0}")]
    Client(#[from] quayside_client::Error),

    /// A response did not carry an expected resource
    #[error("Expected resource missing from response: {0}")]
    MissingEntity(&'static str),
}

/// Result type for workflow operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this wraps the 409 rejection raised when a requested
    /// transition is not valid in the transaction's current state.
    pub fn is_transition_invalid(&self) -> bool {
        matches!(self, Error::Client(client) if client.is_transition_invalid())
    }
}
