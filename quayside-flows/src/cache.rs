//! Shared normalized entity cache.
//!
//! Every successful response is merged into one concurrent store keyed by
//! `(type, id)`, overwriting earlier copies, so views re-derive entities
//! from a single place instead of holding payloads of their own. The
//! denormalizing helpers resolve the relationship references the workflows
//! read back out: a message with its sender, the current user's profile.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use quayside_api::{ApiResponse, ImageAttributes, Resource, ResourceRef, ResourceType};
use uuid::Uuid;

use crate::merge::Identified;

/// A message denormalized for display: attributes plus resolved sender.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Resolved from the `sender` relationship; absent when the sender was
    /// not side-loaded.
    pub sender: Option<Sender>,
}

impl Identified for Message {
    fn identity(&self) -> Uuid {
        self.id
    }
}

/// The resolved sender of a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Sender {
    pub id: Uuid,
    pub display_name: Option<String>,
    pub abbreviated_name: Option<String>,
    pub banned: bool,
    pub deleted: bool,
    pub profile_image: Option<ImageAttributes>,
}

/// Concurrent normalized store of marketplace resources.
#[derive(Debug, Default)]
pub struct EntityCache {
    entities: DashMap<(ResourceType, Uuid), Resource>,
}

impl EntityCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge every resource of a response, primary data and included alike,
    /// into the cache, overwriting earlier copies by identity.
    pub fn add_response(&self, response: &ApiResponse) {
        for resource in response.resources() {
            self.entities
                .insert((resource.resource_type(), resource.id()), resource.clone());
        }
    }

    /// Number of cached entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the cache holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Look up a resource by reference.
    pub fn get(&self, reference: &ResourceRef) -> Option<Resource> {
        self.entities
            .get(&(reference.resource_type, reference.id))
            .map(|entry| entry.value().clone())
    }

    /// Look up a transaction by id.
    pub fn transaction(&self, id: Uuid) -> Option<Resource> {
        self.get(&ResourceRef::transaction(id))
    }

    /// Look up a listing by id.
    pub fn listing(&self, id: Uuid) -> Option<Resource> {
        self.get(&ResourceRef::listing(id))
    }

    /// The cached current user, if any merged response carried one.
    pub fn current_user(&self) -> Option<Resource> {
        self.entities
            .iter()
            .find(|entry| entry.key().0 == ResourceType::CurrentUser)
            .map(|entry| entry.value().clone())
    }

    /// A cached message with its sender resolved from the cache.
    pub fn message(&self, id: Uuid) -> Option<Message> {
        let resource = self.get(&ResourceRef::message(id))?;
        denormalize_message(&resource, &|reference| self.get(reference))
    }
}

/// Denormalize the messages of one page against the page's own side-loaded
/// resources, preserving arrival order.
pub fn messages_from_page(response: &ApiResponse) -> Vec<Message> {
    let lookup = |reference: &ResourceRef| {
        response
            .resources()
            .find(|resource| resource.reference() == *reference)
            .cloned()
    };
    response
        .items()
        .iter()
        .filter_map(|resource| denormalize_message(resource, &lookup))
        .collect()
}

fn denormalize_message(
    resource: &Resource,
    lookup: &dyn Fn(&ResourceRef) -> Option<Resource>,
) -> Option<Message> {
    let attributes = resource.as_message()?;
    let sender = resource
        .related("sender")
        .and_then(|reference| lookup(&reference))
        .map(|user| resolve_sender(&user, lookup));
    Some(Message {
        id: resource.id(),
        content: attributes.content.clone(),
        created_at: attributes.created_at,
        sender,
    })
}

fn resolve_sender(user: &Resource, lookup: &dyn Fn(&ResourceRef) -> Option<Resource>) -> Sender {
    let attributes = user.as_user();
    let profile = attributes.and_then(|a| a.profile.as_ref());
    let profile_image = user
        .related("profileImage")
        .and_then(|reference| lookup(&reference))
        .and_then(|image| image.as_image().cloned());
    Sender {
        id: user.id(),
        display_name: profile.and_then(|p| p.display_name.clone()),
        abbreviated_name: profile.and_then(|p| p.abbreviated_name.clone()),
        banned: attributes.map_or(false, |a| a.banned),
        deleted: attributes.map_or(false, |a| a.deleted),
        profile_image,
    }
}
