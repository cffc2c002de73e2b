//! Resource identifiers and lightweight references.
//!
//! Every marketplace resource is addressed by a UUID together with its
//! resource type. [`ResourceRef`] is the `{ id, type }` pair used to point
//! at cached entities without carrying their attributes around.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

/// The resource types served by the marketplace API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    Transaction,
    Listing,
    User,
    CurrentUser,
    Message,
    Review,
    Booking,
    Image,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Transaction => write!(f, "transaction"),
            ResourceType::Listing => write!(f, "listing"),
            ResourceType::User => write!(f, "user"),
            ResourceType::CurrentUser => write!(f, "currentUser"),
            ResourceType::Message => write!(f, "message"),
            ResourceType::Review => write!(f, "review"),
            ResourceType::Booking => write!(f, "booking"),
            ResourceType::Image => write!(f, "image"),
        }
    }
}

impl TryFrom<&str> for ResourceType {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Error> {
        match value {
            "transaction" => Ok(ResourceType::Transaction),
            "listing" => Ok(ResourceType::Listing),
            "user" => Ok(ResourceType::User),
            "currentUser" => Ok(ResourceType::CurrentUser),
            "message" => Ok(ResourceType::Message),
            "review" => Ok(ResourceType::Review),
            "booking" => Ok(ResourceType::Booking),
            "image" => Ok(ResourceType::Image),
            _ => Err(Error::UnknownResourceType(value.to_string())),
        }
    }
}

/// A lightweight pointer to a marketplace resource.
///
/// References are what workflow state holds on to; the referenced entity
/// itself lives in the shared entity cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
}

impl ResourceRef {
    /// Create a reference to a resource of the given type.
    pub fn new(id: Uuid, resource_type: ResourceType) -> Self {
        Self { id, resource_type }
    }

    /// Reference a transaction by id.
    pub fn transaction(id: Uuid) -> Self {
        Self::new(id, ResourceType::Transaction)
    }

    /// Reference a listing by id.
    pub fn listing(id: Uuid) -> Self {
        Self::new(id, ResourceType::Listing)
    }

    /// Reference a user by id.
    pub fn user(id: Uuid) -> Self {
        Self::new(id, ResourceType::User)
    }

    /// Reference a message by id.
    pub fn message(id: Uuid) -> Self {
        Self::new(id, ResourceType::Message)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.resource_type, self.id)
    }
}
