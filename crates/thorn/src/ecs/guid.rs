//! Stable identifiers that survive save/load.
//!
//! An [`Entity`] handle is only meaningful inside the process that issued it.
//! A [`Guid`] is what gets written to disk: scene files refer to parents by
//! guid, and the [`GuidRegistry`] maps those numbers back to live handles.
//!
//! ## Design: One Counter, Two Maps
//!
//! ```text
//! save:  Entity(3v1) ──guid_of──▶ #12 ──▶ "parent": 12
//! load:  "parent": 12 ──▶ #12 ──resolve──▶ Entity(0v0)
//! ```
//!
//! The registry keeps a `Guid → Entity` map for loading and an
//! `Entity → Guid` map for saving, plus a single counter. The counter only
//! moves forward:
//!
//! - `assign` hands out the counter value and increments it.
//! - `bind` (used when loading) pushes the counter past the bound guid, so a
//!   fresh entity created after a load can never reuse a guid from the file.
//! - `clear` drops the maps but keeps the counter.
//!
//! The counter stops at [`Guid::MAX`] rather than wrapping. Past that point
//! new entities simply get no guid.
//!
//! ## Comparison
//!
//! - **bevy_scene**: keeps a per-load `EntityHashMap` from scene entity to
//!   world entity and throws it away afterwards.
//! - **Godot**: stores node paths, not numeric ids.
//!
//! Here the mapping is permanent for the entity's lifetime, so the editor and
//! scripts can look entities up by guid at any time, not only during a load.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Persistent identifier of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guid(pub u64);

impl Guid {
    /// Largest guid that can be issued or loaded. `u64::MAX` is kept out of
    /// use so the counter always has a successor to move to.
    pub const MAX: Guid = Guid(u64::MAX - 1);

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Bidirectional guid ↔ handle map plus the counter that issues new guids.
///
/// The counter never goes backwards, not even across [`clear`](Self::clear),
/// so every guid issued during a process lifetime is distinct. Binding a
/// loaded guid bumps the counter past it.
pub(crate) struct GuidRegistry {
    next: u64,
    by_guid: HashMap<Guid, Entity>,
    by_entity: HashMap<Entity, Guid>,
}

impl GuidRegistry {
    pub(crate) fn new() -> Self {
        Self {
            next: 1,
            by_guid: HashMap::new(),
            by_entity: HashMap::new(),
        }
    }

    /// Issues a fresh guid and binds it to `entity`. Returns `None` once the
    /// counter has passed [`Guid::MAX`]; it never wraps.
    pub(crate) fn assign(&mut self, entity: Entity) -> Option<Guid> {
        let guid = Guid(self.next);
        if guid > Guid::MAX {
            return None;
        }
        self.next = self.next.checked_add(1)?;
        self.bind(guid, entity);
        Some(guid)
    }

    /// Binds `guid` to `entity`, replacing any previous binding on either
    /// side. Returns the entity that previously owned `guid`, if it was a
    /// different one.
    pub(crate) fn bind(&mut self, guid: Guid, entity: Entity) -> Option<Entity> {
        self.next = self.next.max(guid.0.saturating_add(1));
        if let Some(old_guid) = self.by_entity.insert(entity, guid)
            && old_guid != guid
        {
            self.by_guid.remove(&old_guid);
        }
        let displaced = self.by_guid.insert(guid, entity);
        match displaced {
            Some(other) if other != entity => {
                self.by_entity.remove(&other);
                Some(other)
            }
            _ => None,
        }
    }

    pub(crate) fn resolve(&self, guid: Guid) -> Option<Entity> {
        self.by_guid.get(&guid).copied()
    }

    pub(crate) fn guid_of(&self, entity: Entity) -> Option<Guid> {
        self.by_entity.get(&entity).copied()
    }

    pub(crate) fn unbind_entity(&mut self, entity: Entity) -> Option<Guid> {
        let guid = self.by_entity.remove(&entity)?;
        self.by_guid.remove(&guid);
        Some(guid)
    }

    /// Drops every binding. The counter is kept.
    pub(crate) fn clear(&mut self) {
        self.by_guid.clear();
        self.by_entity.clear();
    }

    #[cfg(any(feature = "diagnostics", test))]
    pub(crate) fn len(&self) -> usize {
        self.by_guid.len()
    }
}
