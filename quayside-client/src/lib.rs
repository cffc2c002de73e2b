//! Async client for the Quayside marketplace API.
//!
//! This crate defines the service seams the workflow controllers call
//! through: per-endpoint traits (`TransactionsApi`, `ListingsApi`,
//! `MessagesApi`, `CurrentUserApi`) aggregated into [`MarketplaceApi`],
//! typed request parameters that know their own wire shape, and a client
//! error taxonomy that normalizes provider failures behind accessors such
//! as [`Error::is_transition_invalid`].
//!
//! The default `http` feature provides [`HttpClient`], a reqwest-backed
//! implementation of all four traits. With the feature disabled the crate
//! still exposes the traits and parameter types for alternative transports
//! and test doubles.

// Internal modules
pub mod api;
pub mod config;
pub mod error;
#[cfg(feature = "http")]
pub mod http;

// Re-export public types for easier access
pub use api::{
    CurrentUserApi, ListingsApi, MarketplaceApi, MessagesApi, ProfilePatch, QueryMessagesParams,
    QueryTransactionsParams, ReviewParams, SendMessageParams, ShowListingParams,
    ShowTransactionParams, TransactionSide, TransactionsApi, TransitionParams,
    TransitionRequestParams, UpdateProfileParams,
};
pub use config::ClientConfig;
pub use error::{Error, Result};
#[cfg(feature = "http")]
pub use http::HttpClient;
