//! Message thread paging.
//!
//! Pages are bounded and merged by identity so overlapping fetches
//! converge. The load-bearing piece is the growth reconciliation: while a
//! caller pages through history, messages can keep arriving on the live
//! end, and the thread absorbs them by re-fetching the newest page.

use quayside_api::ResourceRef;
use quayside_client::{QueryMessagesParams, SendMessageParams};
use tracing::debug;
use uuid::Uuid;

use super::TransactionFlow;
use crate::cache;
use crate::error::{Error, Result};
use crate::state::{StateEvent, StoredError};

/// Related resources side-loaded with every message page.
pub const MESSAGE_INCLUDES: &[&str] = &["sender", "sender.profileImage"];

impl TransactionFlow {
    /// Fetch one page of the transaction's messages.
    ///
    /// After a successful fetch of a history page (page > 1), a server
    /// total larger than the last known total means new messages arrived
    /// on the live end meanwhile; page 1 is then re-fetched exactly once,
    /// and that follow-up's outcome never surfaces to the caller.
    pub async fn fetch_messages(&self, id: Uuid, page: u32) -> Result<()> {
        let grew = self.fetch_messages_page(id, page).await?;
        if grew && page > 1 {
            if let Err(error) = self.fetch_messages_page(id, 1).await {
                debug!(tx_id = %id, error = %error, "message catch-up fetch failed");
            }
        }
        Ok(())
    }

    /// Fetch the next older unfetched page, or re-fetch the frontier page
    /// when no older page remains.
    pub async fn fetch_more_messages(&self, id: Uuid) -> Result<()> {
        let next_page = {
            let state = self.state.read().await;
            // Before any page has landed the frontier is 0; start at 1.
            let oldest = state.oldest_message_page_fetched.max(1);
            if state.total_message_pages > oldest {
                oldest + 1
            } else {
                oldest
            }
        };
        self.fetch_messages(id, next_page).await
    }

    /// Send a message to the transaction's thread. Returns the new
    /// message's id.
    ///
    /// The sent message is not inserted optimistically: a page-1 refresh
    /// makes it visible together with any concurrent arrivals, and the
    /// send is reported complete once that refresh settles either way.
    /// Only the send request's own failure is a send error.
    pub async fn send_message(&self, id: Uuid, content: impl Into<String>) -> Result<Uuid> {
        self.reduce(StateEvent::SendMessageRequest).await;

        let params = SendMessageParams::new(id, content);
        let response = match self.api.send_message(params).await {
            Ok(response) => response,
            Err(error) => {
                self.reduce(StateEvent::SendMessageError {
                    error: StoredError::from(&error),
                })
                .await;
                return Err(error.into());
            }
        };
        let message_id = match response.primary_ref() {
            Some(reference) => reference.id,
            None => {
                let error = Error::MissingEntity("message");
                self.reduce(StateEvent::SendMessageError {
                    error: StoredError::from(&error),
                })
                .await;
                return Err(error);
            }
        };

        if let Err(error) = self.fetch_messages(id, 1).await {
            debug!(tx_id = %id, error = %error, "post-send refresh failed");
        }
        self.reduce(StateEvent::SendMessageSuccess).await;
        self.events
            .publish_message_sent(ResourceRef::transaction(id), message_id)
            .await;

        Ok(message_id)
    }

    /// Fetch and reduce a single message page. Returns whether the server
    /// total grew past the total known before this fetch.
    async fn fetch_messages_page(&self, id: Uuid, page: u32) -> Result<bool> {
        self.reduce(StateEvent::FetchMessagesRequest).await;

        let params = QueryMessagesParams::new(id, page, self.config.message_page_size)
            .with_include(MESSAGE_INCLUDES.iter().copied());
        let response = match self.api.query_messages(params).await {
            Ok(response) => response,
            Err(error) => {
                self.reduce(StateEvent::FetchMessagesError {
                    error: StoredError::from(&error),
                })
                .await;
                return Err(error.into());
            }
        };

        let meta = match response.meta {
            Some(meta) => meta,
            None => {
                let error = Error::MissingEntity("message page meta");
                self.reduce(StateEvent::FetchMessagesError {
                    error: StoredError::from(&error),
                })
                .await;
                return Err(error);
            }
        };

        self.cache.add_response(&response);
        let messages = cache::messages_from_page(&response);

        // Read the previous total and reduce the page under one lock, so
        // the growth comparison cannot race a concurrent fetch.
        let previous_total = {
            let mut state = self.state.write().await;
            let previous = state.total_messages;
            *state = state.apply(StateEvent::FetchMessagesSuccess {
                messages,
                page,
                total_items: meta.total_items,
                total_pages: meta.total_pages,
            });
            previous
        };

        Ok(meta.total_items > previous_total)
    }
}
