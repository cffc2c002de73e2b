//! Service traits and request parameters for the marketplace API.
//!
//! Workflow controllers depend on these traits rather than on a concrete
//! transport, so tests can script responses and production code can plug in
//! [`crate::http::HttpClient`]. Parameter types know their own wire shape:
//! query pairs for GET endpoints and JSON bodies for POST endpoints.

use async_trait::async_trait;
use quayside_api::{ApiResponse, Transition};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

/// Which side of a transaction a query is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionSide {
    /// Transactions where the caller is the provider.
    Sale,
    /// Transactions where the caller is the customer.
    Order,
}

impl TransactionSide {
    /// The wire name of the side.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionSide::Sale => "sale",
            TransactionSide::Order => "order",
        }
    }
}

/// Parameters for [`TransactionsApi::show_transaction`].
#[derive(Debug, Clone, Default)]
pub struct ShowTransactionParams {
    pub id: Uuid,
    pub include: Vec<String>,
    pub expand: bool,
}

impl ShowTransactionParams {
    /// Show the transaction with the given id.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            include: Vec::new(),
            expand: false,
        }
    }

    /// Sets the related resources to side-load.
    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = include.into_iter().map(Into::into).collect();
        self
    }

    /// Asks the API to return full attributes instead of a reference.
    pub fn expanded(mut self) -> Self {
        self.expand = true;
        self
    }

    /// Query pairs for the wire request.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("id", self.id.to_string())];
        push_include(&mut pairs, &self.include);
        push_expand(&mut pairs, self.expand);
        pairs
    }
}

/// Review rating and content submitted with a review transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewParams {
    pub review_rating: u8,
    pub review_content: String,
}

/// Body parameters accompanying a transition request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TransitionRequestParams {
    /// No parameters; serializes as an empty object.
    Empty {},
    /// Parameters for the review transitions.
    Review(ReviewParams),
}

impl Default for TransitionRequestParams {
    fn default() -> Self {
        TransitionRequestParams::Empty {}
    }
}

/// Parameters for [`TransactionsApi::transition_transaction`].
#[derive(Debug, Clone)]
pub struct TransitionParams {
    pub id: Uuid,
    pub transition: Transition,
    pub params: TransitionRequestParams,
    pub include: Vec<String>,
    pub expand: bool,
}

impl TransitionParams {
    /// Request the given transition with empty parameters.
    pub fn new(id: Uuid, transition: Transition) -> Self {
        Self {
            id,
            transition,
            params: TransitionRequestParams::default(),
            include: Vec::new(),
            expand: false,
        }
    }

    /// Request a review transition carrying rating and content.
    pub fn review(id: Uuid, transition: Transition, review: ReviewParams) -> Self {
        Self {
            id,
            transition,
            params: TransitionRequestParams::Review(review),
            include: Vec::new(),
            expand: false,
        }
    }

    /// Sets the related resources to side-load.
    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = include.into_iter().map(Into::into).collect();
        self
    }

    /// Asks the API to return full attributes instead of a reference.
    pub fn expanded(mut self) -> Self {
        self.expand = true;
        self
    }

    /// Query pairs for the wire request.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_include(&mut pairs, &self.include);
        push_expand(&mut pairs, self.expand);
        pairs
    }

    /// JSON body for the wire request.
    pub fn body(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "transition": self.transition,
            "params": &self.params,
        })
    }
}

/// Parameters for [`TransactionsApi::query_transactions`].
#[derive(Debug, Clone, Default)]
pub struct QueryTransactionsParams {
    pub only: Option<TransactionSide>,
    pub last_transitions: Vec<Transition>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl QueryTransactionsParams {
    /// Query transactions on the given side.
    pub fn only(side: TransactionSide) -> Self {
        Self {
            only: Some(side),
            ..Default::default()
        }
    }

    /// Restricts results to transactions whose last transition is in the set.
    pub fn with_last_transitions(mut self, transitions: &[Transition]) -> Self {
        self.last_transitions = transitions.to_vec();
        self
    }

    /// Sets the page to fetch.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Sets the page size.
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Query pairs for the wire request.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(side) = self.only {
            pairs.push(("only", side.as_str().to_string()));
        }
        if !self.last_transitions.is_empty() {
            let tags: Vec<&str> = self.last_transitions.iter().map(Transition::tag).collect();
            pairs.push(("last_transitions", tags.join(",")));
        }
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        pairs
    }
}

/// Parameters for [`ListingsApi::show_listing`].
#[derive(Debug, Clone, Default)]
pub struct ShowListingParams {
    pub id: Uuid,
    pub include: Vec<String>,
}

impl ShowListingParams {
    /// Show the listing with the given id.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            include: Vec::new(),
        }
    }

    /// Sets the related resources to side-load.
    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = include.into_iter().map(Into::into).collect();
        self
    }

    /// Query pairs for the wire request.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("id", self.id.to_string())];
        push_include(&mut pairs, &self.include);
        pairs
    }
}

/// Parameters for [`MessagesApi::query_messages`].
#[derive(Debug, Clone, Default)]
pub struct QueryMessagesParams {
    pub transaction_id: Uuid,
    pub include: Vec<String>,
    pub page: u32,
    pub per_page: u32,
}

impl QueryMessagesParams {
    /// Query one page of a transaction's messages.
    pub fn new(transaction_id: Uuid, page: u32, per_page: u32) -> Self {
        Self {
            transaction_id,
            include: Vec::new(),
            page,
            per_page,
        }
    }

    /// Sets the related resources to side-load.
    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = include.into_iter().map(Into::into).collect();
        self
    }

    /// Query pairs for the wire request.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("transaction_id", self.transaction_id.to_string())];
        push_include(&mut pairs, &self.include);
        pairs.push(("page", self.page.to_string()));
        pairs.push(("per_page", self.per_page.to_string()));
        pairs
    }
}

/// Parameters for [`MessagesApi::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageParams {
    pub transaction_id: Uuid,
    pub content: String,
}

impl SendMessageParams {
    /// Send the given content to a transaction's message thread.
    pub fn new(transaction_id: Uuid, content: impl Into<String>) -> Self {
        Self {
            transaction_id,
            content: content.into(),
        }
    }

    /// JSON body for the wire request.
    pub fn body(&self) -> Value {
        serde_json::json!({
            "transactionId": self.transaction_id,
            "content": self.content,
        })
    }
}

/// Profile fields updated by [`CurrentUserApi::update_profile`].
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Merged into the profile's protected data on the server side.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected_data: Option<Value>,
}

/// Parameters for [`CurrentUserApi::update_profile`].
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileParams {
    pub profile: ProfilePatch,
    pub include: Vec<String>,
    /// Sparse image fields, sent as the `fields.image` query parameter.
    pub image_fields: Vec<String>,
    pub expand: bool,
}

impl UpdateProfileParams {
    /// Update only the protected data of the profile.
    pub fn protected_data(patch: Value) -> Self {
        Self {
            profile: ProfilePatch {
                protected_data: Some(patch),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Sets the related resources to side-load.
    pub fn with_include<I, S>(mut self, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = include.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the image variants to return for side-loaded images.
    pub fn with_image_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.image_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Asks the API to return full attributes instead of a reference.
    pub fn expanded(mut self) -> Self {
        self.expand = true;
        self
    }

    /// Query pairs for the wire request.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_include(&mut pairs, &self.include);
        if !self.image_fields.is_empty() {
            pairs.push(("fields.image", self.image_fields.join(",")));
        }
        push_expand(&mut pairs, self.expand);
        pairs
    }

    /// JSON body for the wire request.
    pub fn body(&self) -> Value {
        serde_json::json!({ "profile": &self.profile })
    }
}

fn push_include(pairs: &mut Vec<(&'static str, String)>, include: &[String]) {
    if !include.is_empty() {
        pairs.push(("include", include.join(",")));
    }
}

fn push_expand(pairs: &mut Vec<(&'static str, String)>, expand: bool) {
    if expand {
        pairs.push(("expand", "true".to_string()));
    }
}

/// Transaction endpoints of the marketplace API.
#[async_trait]
pub trait TransactionsApi: Send + Sync {
    /// Fetch a single transaction.
    async fn show_transaction(&self, params: ShowTransactionParams) -> Result<ApiResponse>;

    /// Request a named transition on a transaction.
    async fn transition_transaction(&self, params: TransitionParams) -> Result<ApiResponse>;

    /// Query the caller's transactions.
    async fn query_transactions(&self, params: QueryTransactionsParams) -> Result<ApiResponse>;
}

/// Listing endpoints of the marketplace API.
#[async_trait]
pub trait ListingsApi: Send + Sync {
    /// Fetch a single listing.
    async fn show_listing(&self, params: ShowListingParams) -> Result<ApiResponse>;
}

/// Message endpoints of the marketplace API.
#[async_trait]
pub trait MessagesApi: Send + Sync {
    /// Query one page of a transaction's messages.
    async fn query_messages(&self, params: QueryMessagesParams) -> Result<ApiResponse>;

    /// Send a message to a transaction's thread.
    async fn send_message(&self, params: SendMessageParams) -> Result<ApiResponse>;
}

/// Current-user endpoints of the marketplace API.
#[async_trait]
pub trait CurrentUserApi: Send + Sync {
    /// Update the current user's profile.
    async fn update_profile(&self, params: UpdateProfileParams) -> Result<ApiResponse>;
}

/// The full marketplace API surface the workflows depend on.
///
/// Blanket-implemented for any type that implements the four endpoint
/// traits, so a single client value can be shared across workflows.
pub trait MarketplaceApi:
    TransactionsApi + ListingsApi + MessagesApi + CurrentUserApi
{
}

impl<T> MarketplaceApi for T where
    T: TransactionsApi + ListingsApi + MessagesApi + CurrentUserApi
{
}
