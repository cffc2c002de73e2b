//! Response envelopes returned by the marketplace API.
//!
//! Successful responses carry primary `data` (one resource or a page of
//! them), side-loaded `included` resources, and pagination `meta`. Failed
//! requests carry an `errors` array with machine-readable codes; the
//! classifier for the 409 invalid-transition rejection lives here so
//! callers never match on raw strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::id::ResourceRef;
use crate::resource::Resource;

/// Primary data of a response: a single resource or a page of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Many(Vec<Resource>),
    One(Resource),
}

/// Pagination metadata attached to query responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_items: u64,
    pub total_pages: u32,
    pub page: u32,
    pub per_page: u32,
}

/// A successful marketplace API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub data: ResponseData,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included: Vec<Resource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

impl ApiResponse {
    /// Build a single-resource response.
    pub fn one(resource: Resource) -> Self {
        Self {
            data: ResponseData::One(resource),
            included: Vec::new(),
            meta: None,
        }
    }

    /// Build a paged response.
    pub fn page(resources: Vec<Resource>, meta: PageMeta) -> Self {
        Self {
            data: ResponseData::Many(resources),
            included: Vec::new(),
            meta: Some(meta),
        }
    }

    /// Attach side-loaded resources, consuming and returning the response.
    pub fn with_included(mut self, included: Vec<Resource>) -> Self {
        self.included = included;
        self
    }

    /// The primary resource: the single resource, or the first of a page.
    pub fn primary(&self) -> Option<&Resource> {
        match &self.data {
            ResponseData::One(resource) => Some(resource),
            ResponseData::Many(resources) => resources.first(),
        }
    }

    /// The `{ id, type }` reference of the primary resource.
    pub fn primary_ref(&self) -> Option<ResourceRef> {
        self.primary().map(Resource::reference)
    }

    /// The primary data as a slice.
    pub fn items(&self) -> &[Resource] {
        match &self.data {
            ResponseData::One(resource) => std::slice::from_ref(resource),
            ResponseData::Many(resources) => resources,
        }
    }

    /// All resources in the response: primary data plus included.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.items().iter().chain(self.included.iter())
    }
}

/// Machine-readable error codes carried by API error responses.
///
/// Codes the workflows do not branch on are preserved verbatim in
/// [`ErrorCode::Other`] rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ErrorCode {
    TransactionInvalidTransition,
    TransactionListingNotFound,
    TransactionAlreadyReviewedByCustomer,
    TransactionAlreadyReviewedByProvider,
    ValidationInvalidParams,
    ValidationInvalidValue,
    NotFound,
    Forbidden,
    Other(String),
}

impl ErrorCode {
    /// The wire name of the code.
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::TransactionInvalidTransition => "transaction-invalid-transition",
            ErrorCode::TransactionListingNotFound => "transaction-listing-not-found",
            ErrorCode::TransactionAlreadyReviewedByCustomer => {
                "transaction-already-reviewed-by-customer"
            }
            ErrorCode::TransactionAlreadyReviewedByProvider => {
                "transaction-already-reviewed-by-provider"
            }
            ErrorCode::ValidationInvalidParams => "validation-invalid-params",
            ErrorCode::ValidationInvalidValue => "validation-invalid-value",
            ErrorCode::NotFound => "not-found",
            ErrorCode::Forbidden => "forbidden",
            ErrorCode::Other(code) => code,
        }
    }
}

impl From<String> for ErrorCode {
    fn from(value: String) -> Self {
        match value.as_str() {
            "transaction-invalid-transition" => ErrorCode::TransactionInvalidTransition,
            "transaction-listing-not-found" => ErrorCode::TransactionListingNotFound,
            "transaction-already-reviewed-by-customer" => {
                ErrorCode::TransactionAlreadyReviewedByCustomer
            }
            "transaction-already-reviewed-by-provider" => {
                ErrorCode::TransactionAlreadyReviewedByProvider
            }
            "validation-invalid-params" => ErrorCode::ValidationInvalidParams,
            "validation-invalid-value" => ErrorCode::ValidationInvalidValue,
            "not-found" => ErrorCode::NotFound,
            "forbidden" => ErrorCode::Forbidden,
            _ => ErrorCode::Other(value),
        }
    }
}

impl From<ErrorCode> for String {
    fn from(value: ErrorCode) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single entry in an API error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub status: u16,
    pub code: ErrorCode,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiErrorBody {
    /// Build an error entry with the required fields.
    pub fn new(status: u16, code: ErrorCode, title: impl Into<String>) -> Self {
        Self {
            id: None,
            status,
            code,
            title: title.into(),
            details: None,
        }
    }
}

/// The error envelope returned for failed API requests.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub errors: Vec<ApiErrorBody>,
}

impl ApiErrorResponse {
    /// Wrap a single error entry.
    pub fn single(error: ApiErrorBody) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// The error code of the leading entry, if any.
    pub fn code(&self) -> Option<&ErrorCode> {
        self.errors.first().map(|error| &error.code)
    }

    /// The HTTP status of the leading entry, if any.
    pub fn status(&self) -> Option<u16> {
        self.errors.first().map(|error| error.status)
    }

    /// Whether any entry carries the given code.
    pub fn has_code(&self, code: &ErrorCode) -> bool {
        self.errors.iter().any(|error| &error.code == code)
    }

    /// Whether this is the 409 rejection raised when a requested transition
    /// is not valid in the transaction's current state.
    pub fn is_transition_invalid(&self) -> bool {
        self.status() == Some(409) && self.code() == Some(&ErrorCode::TransactionInvalidTransition)
    }
}
