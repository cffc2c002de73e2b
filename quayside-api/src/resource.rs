//! Typed marketplace resources.
//!
//! Responses carry resources as `{ id, type, attributes, relationships }`
//! objects. [`Resource`] keys the attribute payload off the `type` tag so
//! every entity deserializes into its own typed attributes, while
//! relationships stay generic name-to-reference maps.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::id::{ResourceRef, ResourceType};
use crate::transition::Transition;

/// Relationship payload: a single reference, a list of them, or empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelationshipData {
    Many(Vec<ResourceRef>),
    One(ResourceRef),
    Empty,
}

/// A named relationship on a resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub data: RelationshipData,
}

impl Relationship {
    /// Build a to-one relationship.
    pub fn one(reference: ResourceRef) -> Self {
        Self {
            data: RelationshipData::One(reference),
        }
    }

    /// Build a to-many relationship.
    pub fn many(references: Vec<ResourceRef>) -> Self {
        Self {
            data: RelationshipData::Many(references),
        }
    }

    /// The single reference of a to-one relationship.
    pub fn reference(&self) -> Option<ResourceRef> {
        match &self.data {
            RelationshipData::One(reference) => Some(*reference),
            RelationshipData::Many(references) => references.first().copied(),
            RelationshipData::Empty => None,
        }
    }

    /// All references carried by the relationship.
    pub fn references(&self) -> Vec<ResourceRef> {
        match &self.data {
            RelationshipData::One(reference) => vec![*reference],
            RelationshipData::Many(references) => references.clone(),
            RelationshipData::Empty => Vec::new(),
        }
    }
}

/// Attributes of a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionAttributes {
    pub created_at: DateTime<Utc>,
    pub last_transition: Transition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transitioned_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListingState {
    Draft,
    PendingApproval,
    Published,
    Closed,
}

/// Attributes of a listing.
///
/// A deleted listing keeps its identity but loses its attributes, so every
/// field other than the `deleted` flag is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ListingState>,
}

/// Public profile carried by user resources.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abbreviated_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Data visible only to the user and the operator. Present on
    /// `currentUser` resources, absent on public `user` resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected_data: Option<Value>,
}

/// Attributes of a user or the current user.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAttributes {
    #[serde(default)]
    pub banned: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

/// Attributes of a transaction message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageAttributes {
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Which party a review is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewType {
    OfProvider,
    OfCustomer,
}

/// Publication state of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewState {
    Pending,
    Public,
}

/// Attributes of a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAttributes {
    #[serde(rename = "type")]
    pub review_type: ReviewType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ReviewState>,
    pub rating: u8,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingState {
    Pending,
    Proposed,
    Accepted,
    Declined,
    Cancelled,
}

/// Attributes of a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingAttributes {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub state: BookingState,
}

/// A single rendition of an uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageVariant {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub url: String,
}

/// Attributes of an image, keyed by variant name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageAttributes {
    #[serde(default)]
    pub variants: HashMap<String, ImageVariant>,
}

/// A typed resource returned by the marketplace API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Resource {
    Transaction {
        id: Uuid,
        attributes: TransactionAttributes,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        relationships: HashMap<String, Relationship>,
    },
    Listing {
        id: Uuid,
        attributes: ListingAttributes,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        relationships: HashMap<String, Relationship>,
    },
    User {
        id: Uuid,
        attributes: UserAttributes,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        relationships: HashMap<String, Relationship>,
    },
    CurrentUser {
        id: Uuid,
        attributes: UserAttributes,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        relationships: HashMap<String, Relationship>,
    },
    Message {
        id: Uuid,
        attributes: MessageAttributes,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        relationships: HashMap<String, Relationship>,
    },
    Review {
        id: Uuid,
        attributes: ReviewAttributes,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        relationships: HashMap<String, Relationship>,
    },
    Booking {
        id: Uuid,
        attributes: BookingAttributes,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        relationships: HashMap<String, Relationship>,
    },
    Image {
        id: Uuid,
        attributes: ImageAttributes,
        #[serde(default, skip_serializing_if = "HashMap::is_empty")]
        relationships: HashMap<String, Relationship>,
    },
}

impl Resource {
    /// Create a transaction resource without relationships.
    pub fn transaction(id: Uuid, attributes: TransactionAttributes) -> Self {
        Resource::Transaction {
            id,
            attributes,
            relationships: HashMap::new(),
        }
    }

    /// Create a listing resource without relationships.
    pub fn listing(id: Uuid, attributes: ListingAttributes) -> Self {
        Resource::Listing {
            id,
            attributes,
            relationships: HashMap::new(),
        }
    }

    /// Create a user resource without relationships.
    pub fn user(id: Uuid, attributes: UserAttributes) -> Self {
        Resource::User {
            id,
            attributes,
            relationships: HashMap::new(),
        }
    }

    /// Create a current-user resource without relationships.
    pub fn current_user(id: Uuid, attributes: UserAttributes) -> Self {
        Resource::CurrentUser {
            id,
            attributes,
            relationships: HashMap::new(),
        }
    }

    /// Create a message resource without relationships.
    pub fn message(id: Uuid, attributes: MessageAttributes) -> Self {
        Resource::Message {
            id,
            attributes,
            relationships: HashMap::new(),
        }
    }

    /// Create a review resource without relationships.
    pub fn review(id: Uuid, attributes: ReviewAttributes) -> Self {
        Resource::Review {
            id,
            attributes,
            relationships: HashMap::new(),
        }
    }

    /// Create a booking resource without relationships.
    pub fn booking(id: Uuid, attributes: BookingAttributes) -> Self {
        Resource::Booking {
            id,
            attributes,
            relationships: HashMap::new(),
        }
    }

    /// Create an image resource without relationships.
    pub fn image(id: Uuid, attributes: ImageAttributes) -> Self {
        Resource::Image {
            id,
            attributes,
            relationships: HashMap::new(),
        }
    }

    /// Attach a named relationship, consuming and returning the resource.
    pub fn with_relationship(mut self, name: impl Into<String>, relationship: Relationship) -> Self {
        self.relationships_mut().insert(name.into(), relationship);
        self
    }

    /// The resource id.
    pub fn id(&self) -> Uuid {
        match self {
            Resource::Transaction { id, .. }
            | Resource::Listing { id, .. }
            | Resource::User { id, .. }
            | Resource::CurrentUser { id, .. }
            | Resource::Message { id, .. }
            | Resource::Review { id, .. }
            | Resource::Booking { id, .. }
            | Resource::Image { id, .. } => *id,
        }
    }

    /// The resource type tag.
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Resource::Transaction { .. } => ResourceType::Transaction,
            Resource::Listing { .. } => ResourceType::Listing,
            Resource::User { .. } => ResourceType::User,
            Resource::CurrentUser { .. } => ResourceType::CurrentUser,
            Resource::Message { .. } => ResourceType::Message,
            Resource::Review { .. } => ResourceType::Review,
            Resource::Booking { .. } => ResourceType::Booking,
            Resource::Image { .. } => ResourceType::Image,
        }
    }

    /// The `{ id, type }` reference to this resource.
    pub fn reference(&self) -> ResourceRef {
        ResourceRef::new(self.id(), self.resource_type())
    }

    /// All relationships of the resource.
    pub fn relationships(&self) -> &HashMap<String, Relationship> {
        match self {
            Resource::Transaction { relationships, .. }
            | Resource::Listing { relationships, .. }
            | Resource::User { relationships, .. }
            | Resource::CurrentUser { relationships, .. }
            | Resource::Message { relationships, .. }
            | Resource::Review { relationships, .. }
            | Resource::Booking { relationships, .. }
            | Resource::Image { relationships, .. } => relationships,
        }
    }

    fn relationships_mut(&mut self) -> &mut HashMap<String, Relationship> {
        match self {
            Resource::Transaction { relationships, .. }
            | Resource::Listing { relationships, .. }
            | Resource::User { relationships, .. }
            | Resource::CurrentUser { relationships, .. }
            | Resource::Message { relationships, .. }
            | Resource::Review { relationships, .. }
            | Resource::Booking { relationships, .. }
            | Resource::Image { relationships, .. } => relationships,
        }
    }

    /// Resolve a named to-one relationship to its reference.
    pub fn related(&self, name: &str) -> Option<ResourceRef> {
        self.relationships()
            .get(name)
            .and_then(|relationship| relationship.reference())
    }

    /// Resolve a named relationship to all its references.
    pub fn related_many(&self, name: &str) -> Vec<ResourceRef> {
        self.relationships()
            .get(name)
            .map(|relationship| relationship.references())
            .unwrap_or_default()
    }

    /// Transaction attributes, if this is a transaction.
    pub fn as_transaction(&self) -> Option<&TransactionAttributes> {
        match self {
            Resource::Transaction { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Listing attributes, if this is a listing.
    pub fn as_listing(&self) -> Option<&ListingAttributes> {
        match self {
            Resource::Listing { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// User attributes, if this is a user or the current user.
    pub fn as_user(&self) -> Option<&UserAttributes> {
        match self {
            Resource::User { attributes, .. } | Resource::CurrentUser { attributes, .. } => {
                Some(attributes)
            }
            _ => None,
        }
    }

    /// Message attributes, if this is a message.
    pub fn as_message(&self) -> Option<&MessageAttributes> {
        match self {
            Resource::Message { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Review attributes, if this is a review.
    pub fn as_review(&self) -> Option<&ReviewAttributes> {
        match self {
            Resource::Review { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Booking attributes, if this is a booking.
    pub fn as_booking(&self) -> Option<&BookingAttributes> {
        match self {
            Resource::Booking { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Image attributes, if this is an image.
    pub fn as_image(&self) -> Option<&ImageAttributes> {
        match self {
            Resource::Image { attributes, .. } => Some(attributes),
            _ => None,
        }
    }
}
