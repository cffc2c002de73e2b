//! Data model for the Quayside marketplace API.
//!
//! This crate provides the wire-level building blocks shared by the
//! marketplace client and the workflow controllers: resource identifiers
//! and references, typed resource objects, the transition vocabulary of
//! the sale process, response envelopes with pagination metadata, and the
//! error payloads returned by failed requests.
//!
//! Nothing here performs I/O; the types exist so that higher layers can
//! speak about transactions, listings, users, messages, and reviews
//! without touching raw JSON.

// Internal modules
pub mod envelope;
pub mod error;
pub mod id;
pub mod resource;
pub mod transition;

// Re-export public types for easier access
pub use envelope::{
    ApiErrorBody, ApiErrorResponse, ApiResponse, ErrorCode, PageMeta, ResponseData,
};
pub use error::{Error, Result};
pub use id::{ResourceRef, ResourceType};
pub use resource::{
    BookingAttributes, BookingState, ImageAttributes, ImageVariant, ListingAttributes,
    ListingState, MessageAttributes, Relationship, RelationshipData, Resource, ReviewAttributes,
    ReviewState, ReviewType, TransactionAttributes, UserAttributes, UserProfile,
};
pub use transition::{TransactionRole, Transition};
