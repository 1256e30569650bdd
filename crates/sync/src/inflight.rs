//! Per-entity in-flight tracking.
//!
//! At most one mutation may be pending per entity. A slot is claimed
//! atomically with [`InFlight::try_begin`] and released when the returned
//! guard is dropped, so failures, early returns and cancelled futures all
//! free the entity again.

use std::fmt;

use bookshelf_types::{BookId, ReadingId, RecommendationId};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::identity::NormalizedIdentity;

/// The entity a mutation targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Book(BookId),
    /// A book that has no id yet.
    Provisional(NormalizedIdentity),
    Recommendation(RecommendationId),
    Reading(ReadingId),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Book(id) => write!(f, "book {}", id),
            EntityKey::Provisional(identity) => write!(f, "book \"{}\"", identity),
            EntityKey::Recommendation(id) => write!(f, "recommendation {}", id),
            EntityKey::Reading(id) => write!(f, "reading {}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InFlightKind {
    Adding,
    Dismissing,
    Updating,
    Deleting,
}

/// Map of entities with a pending mutation.
#[derive(Debug, Default)]
pub struct InFlight {
    entries: DashMap<EntityKey, InFlightKind>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key` for a mutation of `kind`. Returns `None` while any other
    /// mutation on the same entity is pending.
    pub fn try_begin(&self, key: EntityKey, kind: InFlightKind) -> Option<InFlightGuard<'_>> {
        match self.entries.entry(key.clone()) {
            Entry::Occupied(existing) => {
                debug!(
                    "Suppressing {:?} of {}: {:?} already in flight",
                    kind,
                    key,
                    existing.get()
                );
                None
            }
            Entry::Vacant(slot) => {
                slot.insert(kind);
                Some(InFlightGuard { owner: self, key })
            }
        }
    }

    pub fn is_in_flight(&self, key: &EntityKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Kind of the pending mutation on `key`, if any.
    pub fn kind_of(&self, key: &EntityKey) -> Option<InFlightKind> {
        self.entries.get(key).map(|entry| *entry.value())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Releases its entity on drop.
#[must_use = "the entity is released as soon as the guard is dropped"]
pub struct InFlightGuard<'a> {
    owner: &'a InFlight,
    key: EntityKey,
}

impl InFlightGuard<'_> {
    pub fn key(&self) -> &EntityKey {
        &self.key
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.owner.entries.remove(&self.key);
    }
}
