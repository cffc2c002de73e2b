//! The transaction workflow controller.
//!
//! One [`TransactionFlow`] drives a single transaction page visit: it
//! fetches the transaction with its listing and parties, performs the
//! provider's accept/decline decision, pages through the message thread,
//! and submits reviews. Outcomes are reduced into a [`TxFlowState`]
//! snapshot, entities land in the shared [`EntityCache`], and completed
//! operations are published on the [`EventBus`].

mod messages;
mod review;

pub use messages::MESSAGE_INCLUDES;
pub use review::REVIEW_TRANSACTION_INCLUDES;

use std::sync::Arc;

use futures::future;
use quayside_api::{ResourceRef, Transition};
use quayside_client::{
    MarketplaceApi, ShowListingParams, ShowTransactionParams, TransitionParams,
};
use tokio::sync::RwLock;
use tracing::{debug, error};
use uuid::Uuid;

use crate::cache::EntityCache;
use crate::config::FlowConfig;
use crate::error::{Error, Result};
use crate::event::EventBus;
use crate::state::{StateEvent, StoredError, TxFlowState};

/// Related resources side-loaded with a transaction fetch.
pub const TRANSACTION_INCLUDES: &[&str] = &[
    "customer",
    "customer.profileImage",
    "provider",
    "provider.profileImage",
    "listing",
    "booking",
    "reviews",
    "reviews.author",
    "reviews.subject",
];

/// Related resources side-loaded with the listing enrichment fetch.
pub const LISTING_INCLUDES: &[&str] = &["author", "author.profileImage", "images"];

/// Controller for one transaction page visit.
pub struct TransactionFlow {
    api: Arc<dyn MarketplaceApi>,
    cache: Arc<EntityCache>,
    events: Arc<EventBus>,
    state: RwLock<TxFlowState>,
    config: FlowConfig,
}

impl TransactionFlow {
    /// Create a controller over the given API, cache, and event bus.
    pub fn new(
        api: Arc<dyn MarketplaceApi>,
        cache: Arc<EntityCache>,
        events: Arc<EventBus>,
        config: FlowConfig,
    ) -> Self {
        Self {
            api,
            cache,
            events,
            state: RwLock::new(TxFlowState::default()),
            config,
        }
    }

    /// A snapshot of the current workflow state.
    pub async fn state(&self) -> TxFlowState {
        self.state.read().await.clone()
    }

    /// The shared entity cache backing this controller.
    pub fn cache(&self) -> &Arc<EntityCache> {
        &self.cache
    }

    pub(crate) async fn reduce(&self, event: StateEvent) {
        let mut state = self.state.write().await;
        *state = state.apply(event);
    }

    /// Reset state and load the page: the transaction itself and the first
    /// message page, fetched concurrently.
    pub async fn load(&self, id: Uuid) -> Result<ResourceRef> {
        self.reduce(StateEvent::Reset).await;
        let (transaction, messages) =
            future::join(self.fetch_transaction(id), self.fetch_messages(id, 1)).await;
        let transaction = transaction?;
        messages?;
        Ok(transaction)
    }

    /// Fetch a transaction with its parties, listing, booking, and reviews.
    ///
    /// The listing is re-fetched expanded with its author and images when
    /// it exists and is not deleted; that enrichment is best-effort and its
    /// failure does not fail the fetch. On success the state records a
    /// lightweight `{ id, type }` reference while full entities land in the
    /// shared cache.
    pub async fn fetch_transaction(&self, id: Uuid) -> Result<ResourceRef> {
        {
            let mut state = self.state.write().await;
            if state.fetch_transaction_in_progress {
                return Err(Error::AlreadyPending("fetch_transaction"));
            }
            *state = state.apply(StateEvent::FetchTransactionRequest);
        }

        let params = ShowTransactionParams::new(id)
            .with_include(TRANSACTION_INCLUDES.iter().copied())
            .expanded();
        let response = match self.api.show_transaction(params).await {
            Ok(response) => response,
            Err(error) => {
                self.reduce(StateEvent::FetchTransactionError {
                    error: StoredError::from(&error),
                })
                .await;
                return Err(error.into());
            }
        };

        let transaction = match response.primary_ref() {
            Some(reference) => reference,
            None => {
                let error = Error::MissingEntity("transaction");
                self.reduce(StateEvent::FetchTransactionError {
                    error: StoredError::from(&error),
                })
                .await;
                return Err(error);
            }
        };
        self.cache.add_response(&response);

        if let Some(listing) = response.primary().and_then(|tx| tx.related("listing")) {
            let embedded = response
                .resources()
                .find(|resource| resource.reference() == listing);
            let can_fetch = embedded
                .and_then(|resource| resource.as_listing())
                .map_or(false, |attributes| !attributes.deleted);
            if can_fetch {
                let params = ShowListingParams::new(listing.id)
                    .with_include(LISTING_INCLUDES.iter().copied());
                match self.api.show_listing(params).await {
                    Ok(listing_response) => self.cache.add_response(&listing_response),
                    Err(error) => {
                        debug!(listing_id = %listing.id, error = %error, "listing enrichment failed");
                    }
                }
            }
        }

        self.reduce(StateEvent::FetchTransactionSuccess { transaction })
            .await;
        self.events.publish_transaction_fetched(transaction).await;
        Ok(transaction)
    }

    /// Accept a sale. Mutually exclusive with [`Self::decline_sale`].
    pub async fn accept_sale(&self, id: Uuid) -> Result<ResourceRef> {
        self.sale_decision(
            id,
            Transition::Accept,
            StateEvent::AcceptSaleRequest,
            StateEvent::AcceptSaleSuccess,
            |error| StateEvent::AcceptSaleError { error },
        )
        .await
    }

    /// Decline a sale. Mutually exclusive with [`Self::accept_sale`].
    pub async fn decline_sale(&self, id: Uuid) -> Result<ResourceRef> {
        self.sale_decision(
            id,
            Transition::Decline,
            StateEvent::DeclineSaleRequest,
            StateEvent::DeclineSaleSuccess,
            |error| StateEvent::DeclineSaleError { error },
        )
        .await
    }

    /// The shared body of the accept/decline decision.
    ///
    /// The in-progress guard is checked and the request event reduced under
    /// one write lock, so overlapping decisions cannot both pass the guard.
    /// The refused attempt issues no request.
    async fn sale_decision(
        &self,
        id: Uuid,
        transition: Transition,
        request: StateEvent,
        success: StateEvent,
        failure: fn(StoredError) -> StateEvent,
    ) -> Result<ResourceRef> {
        {
            let mut state = self.state.write().await;
            if state.accept_or_decline_in_progress() {
                return Err(Error::AlreadyPending("sale decision"));
            }
            *state = state.apply(request);
        }

        let params = TransitionParams::new(id, transition).expanded();
        match self.api.transition_transaction(params).await {
            Ok(response) => {
                self.cache.add_response(&response);
                self.reduce(success).await;
                let reference = ResourceRef::transaction(id);
                self.events
                    .publish_sale_transitioned(reference, transition)
                    .await;
                Ok(reference)
            }
            Err(client_error) => {
                self.reduce(failure(StoredError::from(&client_error))).await;
                error!(
                    tx_id = %id,
                    transition = %transition,
                    error = %client_error,
                    "sale decision failed"
                );
                Err(client_error.into())
            }
        }
    }
}
