//! Identity-keyed reconciliation of ordered entity collections.
//!
//! Paginated fetches overlap: a message can appear both in an already-held
//! page and in a fresh one. [`merge_by_id`] reconciles the two collections
//! so each identity survives exactly once, resolved to the newer copy.

use std::collections::HashSet;

use quayside_api::{Resource, ResourceRef};
use uuid::Uuid;

/// Types carrying a stable identity usable for merge reconciliation.
pub trait Identified {
    /// The identity of this value.
    fn identity(&self) -> Uuid;
}

impl Identified for ResourceRef {
    fn identity(&self) -> Uuid {
        self.id
    }
}

impl Identified for Resource {
    fn identity(&self) -> Uuid {
        self.id()
    }
}

/// Merge two ordered collections by identity, favoring the newer one.
///
/// Keeps every item of `old` whose identity is absent from `new`, in their
/// original order, then appends all of `new`. An item present in both
/// collections ends up once, at its position in `new`.
pub fn merge_by_id<T: Identified>(old: Vec<T>, new: Vec<T>) -> Vec<T> {
    let incoming: HashSet<Uuid> = new.iter().map(Identified::identity).collect();
    let mut merged: Vec<T> = old
        .into_iter()
        .filter(|item| !incoming.contains(&item.identity()))
        .collect();
    merged.extend(new);
    merged
}
