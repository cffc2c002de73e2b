//! Error types for the quayside-api crate.

use std::result;
use thiserror::Error;

/// Errors raised while interpreting marketplace wire data.
#[derive(Debug, Error)]
pub enum Error {
    /// A wire value did not name a known resource type.
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    /// A wire value did not name a known transition.
    #[error("Unknown transition: {0}")]
    UnknownTransition(String),

    /// A wire value did not name a known transaction role.
    #[error("Unknown transaction role: {0}")]
    UnknownRole(String),

    /// Error related to serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Custom Result type for marketplace data-model operations.
pub type Result<T> = result::Result<T, Error>;
