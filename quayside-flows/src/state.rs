//! Workflow state for one transaction page visit.
//!
//! [`TxFlowState`] is an immutable snapshot: the per-operation status
//! flags and stored errors, the transaction reference, and the merged
//! message thread with its pagination cursor. State only advances through
//! [`TxFlowState::apply`], a pure total function over [`StateEvent`] —
//! controllers reduce events into the snapshot they own and hand out
//! clones to the view layer.
//!
//! # Invariants
//!
//! - A sale-decision request clears *both* decision errors, so a stale
//!   accept failure does not linger next to a fresh decline attempt.
//! - `oldest_message_page_fetched` is monotone: it tracks the frontier of
//!   historical pages and never moves back when page 1 is refreshed.
//! - Messages merge by identity; a message seen in two overlapping pages
//!   survives once, at the newer fetch's position.

use quayside_api::ResourceRef;
use serde::{Deserialize, Serialize};

use crate::cache::Message;
use crate::merge::merge_by_id;

// ---------------------------------------------------------------------------
// Stored errors
// ---------------------------------------------------------------------------

/// A storable rendering of a failed operation, kept in state for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredError {
    /// HTTP status when the failure was an API rejection.
    pub status: Option<u16>,
    /// Leading machine-readable code of an API rejection.
    pub code: Option<String>,
    /// Human-readable description.
    pub message: String,
}

impl From<&quayside_client::Error> for StoredError {
    fn from(error: &quayside_client::Error) -> Self {
        Self {
            status: error.status(),
            code: error.code().map(|code| code.as_str().to_string()),
            message: error.to_string(),
        }
    }
}

impl From<&crate::error::Error> for StoredError {
    fn from(error: &crate::error::Error) -> Self {
        match error {
            crate::error::Error::Client(client) => StoredError::from(client),
            other => Self {
                status: None,
                code: None,
                message: other.to_string(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// The state snapshot
// ---------------------------------------------------------------------------

/// Snapshot of the transaction workflow for a single page visit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxFlowState {
    /// Reference to the fetched transaction; full entities live in the
    /// shared cache.
    pub transaction_ref: Option<ResourceRef>,

    pub fetch_transaction_in_progress: bool,
    pub fetch_transaction_error: Option<StoredError>,

    pub accept_in_progress: bool,
    pub accept_error: Option<StoredError>,
    pub decline_in_progress: bool,
    pub decline_error: Option<StoredError>,

    pub fetch_messages_in_progress: bool,
    pub fetch_messages_error: Option<StoredError>,
    /// Server-reported total of messages in the thread.
    pub total_messages: u64,
    /// Server-reported number of message pages.
    pub total_message_pages: u32,
    /// Frontier of historical pages fetched so far; 0 until the first
    /// fetch lands.
    pub oldest_message_page_fetched: u32,
    /// The merged message thread, sender resolved.
    pub messages: Vec<Message>,

    pub send_message_in_progress: bool,
    pub send_message_error: Option<StoredError>,

    pub send_review_in_progress: bool,
    pub send_review_error: Option<StoredError>,
}

// ---------------------------------------------------------------------------
// Events that drive the reducer
// ---------------------------------------------------------------------------

/// An event reduced into [`TxFlowState`] by [`TxFlowState::apply`].
#[derive(Debug, Clone)]
pub enum StateEvent {
    /// Restore the initial snapshot, e.g. when a new transaction id loads.
    Reset,

    FetchTransactionRequest,
    FetchTransactionSuccess {
        /// Reference to the fetched transaction.
        transaction: ResourceRef,
    },
    FetchTransactionError {
        error: StoredError,
    },

    AcceptSaleRequest,
    AcceptSaleSuccess,
    AcceptSaleError {
        error: StoredError,
    },

    DeclineSaleRequest,
    DeclineSaleSuccess,
    DeclineSaleError {
        error: StoredError,
    },

    FetchMessagesRequest,
    FetchMessagesSuccess {
        /// The fetched page, in arrival order.
        messages: Vec<Message>,
        /// Which page was fetched.
        page: u32,
        /// Server-reported thread total.
        total_items: u64,
        /// Server-reported page count.
        total_pages: u32,
    },
    FetchMessagesError {
        error: StoredError,
    },

    SendMessageRequest,
    SendMessageSuccess,
    SendMessageError {
        error: StoredError,
    },

    SendReviewRequest,
    SendReviewSuccess,
    SendReviewError {
        error: StoredError,
    },
}

impl TxFlowState {
    /// Reduce an event into a new snapshot.
    ///
    /// Pure and total: every event maps to a next state, and the receiver
    /// is never mutated.
    pub fn apply(&self, event: StateEvent) -> TxFlowState {
        let mut next = self.clone();
        match event {
            StateEvent::Reset => next = TxFlowState::default(),

            StateEvent::FetchTransactionRequest => {
                next.fetch_transaction_in_progress = true;
                next.fetch_transaction_error = None;
            }
            StateEvent::FetchTransactionSuccess { transaction } => {
                next.fetch_transaction_in_progress = false;
                next.transaction_ref = Some(transaction);
            }
            StateEvent::FetchTransactionError { error } => {
                next.fetch_transaction_in_progress = false;
                next.fetch_transaction_error = Some(error);
            }

            StateEvent::AcceptSaleRequest => {
                next.accept_in_progress = true;
                next.accept_error = None;
                next.decline_error = None;
            }
            StateEvent::AcceptSaleSuccess => next.accept_in_progress = false,
            StateEvent::AcceptSaleError { error } => {
                next.accept_in_progress = false;
                next.accept_error = Some(error);
            }

            StateEvent::DeclineSaleRequest => {
                next.decline_in_progress = true;
                next.decline_error = None;
                next.accept_error = None;
            }
            StateEvent::DeclineSaleSuccess => next.decline_in_progress = false,
            StateEvent::DeclineSaleError { error } => {
                next.decline_in_progress = false;
                next.decline_error = Some(error);
            }

            StateEvent::FetchMessagesRequest => {
                next.fetch_messages_in_progress = true;
                next.fetch_messages_error = None;
            }
            StateEvent::FetchMessagesSuccess {
                messages,
                page,
                total_items,
                total_pages,
            } => {
                next.fetch_messages_in_progress = false;
                next.messages = merge_by_id(std::mem::take(&mut next.messages), messages);
                next.oldest_message_page_fetched = next.oldest_message_page_fetched.max(page);
                next.total_messages = total_items;
                next.total_message_pages = total_pages;
            }
            StateEvent::FetchMessagesError { error } => {
                next.fetch_messages_in_progress = false;
                next.fetch_messages_error = Some(error);
            }

            StateEvent::SendMessageRequest => {
                next.send_message_in_progress = true;
                next.send_message_error = None;
            }
            StateEvent::SendMessageSuccess => next.send_message_in_progress = false,
            StateEvent::SendMessageError { error } => {
                next.send_message_in_progress = false;
                next.send_message_error = Some(error);
            }

            StateEvent::SendReviewRequest => {
                next.send_review_in_progress = true;
                next.send_review_error = None;
            }
            StateEvent::SendReviewSuccess => next.send_review_in_progress = false,
            StateEvent::SendReviewError { error } => {
                next.send_review_in_progress = false;
                next.send_review_error = Some(error);
            }
        }
        next
    }

    /// Whether a sale decision is currently in flight.
    pub fn accept_or_decline_in_progress(&self) -> bool {
        self.accept_in_progress || self.decline_in_progress
    }
}
