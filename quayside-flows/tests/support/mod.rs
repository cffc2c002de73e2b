//! Shared test support: a scriptable marketplace API double plus resource
//! fixtures for transactions, listings, members, and message pages.

#![allow(dead_code)] // not every suite uses every helper

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use quayside_api::{
    ApiErrorBody, ApiErrorResponse, ApiResponse, ErrorCode, ListingAttributes, MessageAttributes,
    PageMeta, Relationship, Resource, ResourceRef, TransactionAttributes, Transition,
    UserAttributes, UserProfile,
};
use quayside_client::{
    CurrentUserApi, ListingsApi, MessagesApi, QueryMessagesParams, QueryTransactionsParams,
    SendMessageParams, ShowListingParams, ShowTransactionParams, TransactionSide, TransactionsApi,
    TransitionParams, UpdateProfileParams,
};
use quayside_flows::{EntityCache, EventBus, FlowConfig, TransactionFlow};
use serde_json::Value;
use uuid::Uuid;

// ----------------------------------------------------------------------------
// Scripted API double
// ----------------------------------------------------------------------------

/// One recorded endpoint hit, with the parameters worth asserting on.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    ShowTransaction {
        id: Uuid,
        include: Vec<String>,
        expand: bool,
    },
    Transition {
        id: Uuid,
        transition: Transition,
        include: Vec<String>,
        expand: bool,
    },
    QueryTransactions {
        only: Option<TransactionSide>,
        last_transitions: Vec<Transition>,
        page: Option<u32>,
        per_page: Option<u32>,
    },
    ShowListing {
        id: Uuid,
        include: Vec<String>,
    },
    QueryMessages {
        transaction_id: Uuid,
        page: u32,
        per_page: u32,
    },
    SendMessage {
        transaction_id: Uuid,
        content: String,
    },
    UpdateProfile {
        protected_data: Option<Value>,
        include: Vec<String>,
    },
}

type Scripted = Mutex<VecDeque<quayside_client::Result<ApiResponse>>>;

/// A marketplace API double that replays scripted responses in FIFO order
/// and records every call.
///
/// Each endpoint panics when called with nothing scripted, so a test that
/// triggers an unexpected request fails loudly instead of hanging.
#[derive(Default)]
pub struct MockApi {
    show_transaction: Scripted,
    transition: Scripted,
    query_transactions: Scripted,
    show_listing: Scripted,
    query_messages: Scripted,
    send_message: Scripted,
    update_profile: Scripted,
    transition_delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script_show_transaction(&self, result: quayside_client::Result<ApiResponse>) {
        self.show_transaction.lock().unwrap().push_back(result);
    }

    pub fn script_transition(&self, result: quayside_client::Result<ApiResponse>) {
        self.transition.lock().unwrap().push_back(result);
    }

    pub fn script_query_transactions(&self, result: quayside_client::Result<ApiResponse>) {
        self.query_transactions.lock().unwrap().push_back(result);
    }

    pub fn script_show_listing(&self, result: quayside_client::Result<ApiResponse>) {
        self.show_listing.lock().unwrap().push_back(result);
    }

    pub fn script_query_messages(&self, result: quayside_client::Result<ApiResponse>) {
        self.query_messages.lock().unwrap().push_back(result);
    }

    pub fn script_send_message(&self, result: quayside_client::Result<ApiResponse>) {
        self.send_message.lock().unwrap().push_back(result);
    }

    pub fn script_update_profile(&self, result: quayside_client::Result<ApiResponse>) {
        self.update_profile.lock().unwrap().push_back(result);
    }

    /// Hold every transition request for the given duration before
    /// answering. Pairs with `start_paused` tests to keep a call in flight
    /// at a deterministic point.
    pub fn delay_transitions(&self, delay: Duration) {
        *self.transition_delay.lock().unwrap() = Some(delay);
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The recorded calls that hit the given endpoint name.
    pub fn calls_to(&self, endpoint: &str) -> Vec<ApiCall> {
        self.calls()
            .into_iter()
            .filter(|call| endpoint_name(call) == endpoint)
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn pop(queue: &Scripted, endpoint: &str) -> quayside_client::Result<ApiResponse> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted response left for {endpoint}"))
    }
}

fn endpoint_name(call: &ApiCall) -> &'static str {
    match call {
        ApiCall::ShowTransaction { .. } => "show_transaction",
        ApiCall::Transition { .. } => "transition",
        ApiCall::QueryTransactions { .. } => "query_transactions",
        ApiCall::ShowListing { .. } => "show_listing",
        ApiCall::QueryMessages { .. } => "query_messages",
        ApiCall::SendMessage { .. } => "send_message",
        ApiCall::UpdateProfile { .. } => "update_profile",
    }
}

#[async_trait]
impl TransactionsApi for MockApi {
    async fn show_transaction(
        &self,
        params: ShowTransactionParams,
    ) -> quayside_client::Result<ApiResponse> {
        self.record(ApiCall::ShowTransaction {
            id: params.id,
            include: params.include,
            expand: params.expand,
        });
        Self::pop(&self.show_transaction, "show_transaction")
    }

    async fn transition_transaction(
        &self,
        params: TransitionParams,
    ) -> quayside_client::Result<ApiResponse> {
        self.record(ApiCall::Transition {
            id: params.id,
            transition: params.transition,
            include: params.include,
            expand: params.expand,
        });
        let delay = *self.transition_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Self::pop(&self.transition, "transition")
    }

    async fn query_transactions(
        &self,
        params: QueryTransactionsParams,
    ) -> quayside_client::Result<ApiResponse> {
        self.record(ApiCall::QueryTransactions {
            only: params.only,
            last_transitions: params.last_transitions,
            page: params.page,
            per_page: params.per_page,
        });
        Self::pop(&self.query_transactions, "query_transactions")
    }
}

#[async_trait]
impl ListingsApi for MockApi {
    async fn show_listing(
        &self,
        params: ShowListingParams,
    ) -> quayside_client::Result<ApiResponse> {
        self.record(ApiCall::ShowListing {
            id: params.id,
            include: params.include,
        });
        Self::pop(&self.show_listing, "show_listing")
    }
}

#[async_trait]
impl MessagesApi for MockApi {
    async fn query_messages(
        &self,
        params: QueryMessagesParams,
    ) -> quayside_client::Result<ApiResponse> {
        self.record(ApiCall::QueryMessages {
            transaction_id: params.transaction_id,
            page: params.page,
            per_page: params.per_page,
        });
        Self::pop(&self.query_messages, "query_messages")
    }

    async fn send_message(
        &self,
        params: SendMessageParams,
    ) -> quayside_client::Result<ApiResponse> {
        self.record(ApiCall::SendMessage {
            transaction_id: params.transaction_id,
            content: params.content,
        });
        Self::pop(&self.send_message, "send_message")
    }
}

#[async_trait]
impl CurrentUserApi for MockApi {
    async fn update_profile(
        &self,
        params: UpdateProfileParams,
    ) -> quayside_client::Result<ApiResponse> {
        self.record(ApiCall::UpdateProfile {
            protected_data: params.profile.protected_data,
            include: params.include,
        });
        Self::pop(&self.update_profile, "update_profile")
    }
}

// ----------------------------------------------------------------------------
// Harness
// ----------------------------------------------------------------------------

/// A transaction flow wired to the given API double, with the cache and
/// event bus returned for assertions.
pub fn new_flow(api: Arc<MockApi>) -> (TransactionFlow, Arc<EntityCache>, Arc<EventBus>) {
    let cache = Arc::new(EntityCache::new());
    let events = Arc::new(EventBus::new());
    let flow = TransactionFlow::new(
        api,
        Arc::clone(&cache),
        Arc::clone(&events),
        FlowConfig::default(),
    );
    (flow, cache, events)
}

// ----------------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------------

/// Transaction attributes with the given last transition.
pub fn tx_attributes(last_transition: Transition) -> TransactionAttributes {
    TransactionAttributes {
        created_at: Utc::now(),
        last_transition,
        last_transitioned_at: Some(Utc::now()),
    }
}

/// A sale transaction with listing, customer, and provider relationships.
pub fn sale_transaction(
    id: Uuid,
    listing_id: Uuid,
    customer_id: Uuid,
    provider_id: Uuid,
    last_transition: Transition,
) -> Resource {
    Resource::transaction(id, tx_attributes(last_transition))
        .with_relationship("listing", Relationship::one(ResourceRef::listing(listing_id)))
        .with_relationship("customer", Relationship::one(ResourceRef::user(customer_id)))
        .with_relationship("provider", Relationship::one(ResourceRef::user(provider_id)))
}

/// A published berth listing.
pub fn berth_listing(id: Uuid, title: &str) -> Resource {
    Resource::listing(
        id,
        ListingAttributes {
            title: Some(title.to_string()),
            ..Default::default()
        },
    )
}

/// A listing whose attributes are gone apart from the deleted flag.
pub fn deleted_listing(id: Uuid) -> Resource {
    Resource::listing(
        id,
        ListingAttributes {
            deleted: true,
            ..Default::default()
        },
    )
}

/// A marketplace member with a display name.
pub fn member(id: Uuid, name: &str) -> Resource {
    Resource::user(
        id,
        UserAttributes {
            profile: Some(UserProfile {
                display_name: Some(name.to_string()),
                abbreviated_name: Some(name.chars().take(2).collect()),
                ..Default::default()
            }),
            ..Default::default()
        },
    )
}

/// A message in a transaction thread, related to its sender.
pub fn chat_message(id: Uuid, sender_id: Uuid, content: &str) -> Resource {
    Resource::message(
        id,
        MessageAttributes {
            content: content.to_string(),
            created_at: Utc::now(),
        },
    )
    .with_relationship("sender", Relationship::one(ResourceRef::user(sender_id)))
}

/// Pagination metadata for a message page.
pub fn meta(total_items: u64, total_pages: u32, page: u32) -> PageMeta {
    PageMeta {
        total_items,
        total_pages,
        page,
        per_page: 100,
    }
}

/// A paged message response with the senders side-loaded.
pub fn message_page(
    messages: Vec<Resource>,
    senders: Vec<Resource>,
    meta: PageMeta,
) -> ApiResponse {
    ApiResponse::page(messages, meta).with_included(senders)
}

/// Owned copies of a static include list, for comparing against recorded
/// call parameters.
pub fn strings(slice: &[&str]) -> Vec<String> {
    slice.iter().map(ToString::to_string).collect()
}

/// An API rejection with the given status and code.
pub fn api_error(status: u16, code: ErrorCode) -> quayside_client::Error {
    quayside_client::Error::Api {
        status,
        body: ApiErrorResponse::single(ApiErrorBody::new(status, code, "rejected")),
    }
}

/// The 409 rejection the platform answers an invalid transition with.
pub fn invalid_transition_error() -> quayside_client::Error {
    api_error(409, ErrorCode::TransactionInvalidTransition)
}
