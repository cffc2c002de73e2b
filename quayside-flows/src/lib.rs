//! # Quayside Workflow Controllers
//!
//! This crate implements the transaction-page workflows of the Quayside
//! marketplace: loading a sale with its listing and message thread,
//! accepting or declining it, paging through messages while new ones keep
//! arriving, submitting the two-party review handshake, and saving payout
//! account details.
//!
//! ## Overview
//!
//! Every workflow follows the same shape:
//!
//! - State lives in a small value type (`TxFlowState`, `PayoutState`)
//!   advanced only by a pure reducer, so each operation's in-progress flag
//!   and last error are reproducible from the event sequence.
//! - Entity bodies returned by the marketplace API are merged into a
//!   shared [`EntityCache`]; workflow state holds `{ id, type }`
//!   references and re-derives full entities from the cache.
//! - Completed operations publish a [`FlowEvent`] on the [`EventBus`],
//!   where subscribers such as [`NotificationRefresher`] react without
//!   being wired into the flows themselves.
//!
//! The controllers call the marketplace through the trait seams defined in
//! `quayside-client`, so tests drive them with scripted fakes and
//! production code hands them the reqwest-backed client.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use quayside_client::{ClientConfig, HttpClient};
//! use quayside_flows::{EntityCache, EventBus, FlowConfig, NotificationRefresher, TransactionFlow};
//!
//! async fn example(transaction_id: uuid::Uuid) -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Arc::new(HttpClient::new(
//!         ClientConfig::new("https://api.quayside.example").with_client_id("my-client-id"),
//!     )?);
//!     let cache = Arc::new(EntityCache::new());
//!     let events = Arc::new(EventBus::new());
//!     let config = FlowConfig::default();
//!
//!     // Keep the unread-sale count fresh after decisions and reviews.
//!     let refresher = NotificationRefresher::new(client.clone(), events.clone(), &config);
//!     events.subscribe(Arc::new(refresher)).await;
//!
//!     let flow = TransactionFlow::new(client, cache, events, config);
//!     flow.load(transaction_id).await?;
//!     flow.accept_sale(transaction_id).await?;
//!     flow.send_message(transaction_id, "See you at the dock.").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! Flow values are `Send + Sync` and meant to be shared behind an `Arc`.
//! Operations take `&self`; state is guarded by an async `RwLock` and the
//! entity cache by a concurrent map, so overlapping calls from different
//! tasks are safe. Accept and decline additionally exclude each other
//! through an in-progress guard rather than racing to the platform.

pub mod cache;
pub mod config;
pub mod error;
pub mod event;
pub mod merge;
pub mod payout;
pub mod state;
pub mod transaction;

pub use cache::{messages_from_page, EntityCache, Message, Sender};
pub use config::FlowConfig;
pub use error::{Error, Result};
pub use event::{EventBus, EventSubscriber, FlowEvent, NotificationRefresher};
pub use merge::{merge_by_id, Identified};
pub use payout::{PayoutFlow, PayoutState, PROFILE_IMAGE_VARIANTS};
pub use state::{StateEvent, StoredError, TxFlowState};
pub use transaction::{
    TransactionFlow, LISTING_INCLUDES, MESSAGE_INCLUDES, REVIEW_TRANSACTION_INCLUDES,
    TRANSACTION_INCLUDES,
};
