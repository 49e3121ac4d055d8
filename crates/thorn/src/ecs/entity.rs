//! # Entity: Generational Handles
//!
//! An [`Entity`] is a slot index paired with a generation counter. The
//! [`World`](super::world::World) owns every slot; callers only ever hold
//! handles.
//!
//! ```text
//! Entity { index: 5, generation: 0 }  ← original
//! Entity { index: 5, generation: 1 }  ← same slot after destroy + create
//! ```
//!
//! Destroying an entity bumps its slot's generation and pushes the slot onto
//! a free list. A handle kept from before the destroy still says
//! `generation: 0`, so every lookup through it fails instead of silently
//! reaching the slot's new occupant.
//!
//! A slot whose generation reaches `u32::MAX` is retired instead of wrapping
//! back to zero.
//!
//! Each slot also records whether it is occupied. A handle carrying the
//! *next* generation of a freed slot was never handed out, and must not be
//! reported as alive.

use std::fmt;

/// A lightweight handle to an entity in the [`World`](super::world::World).
///
/// Handles are `Copy` and cheap to store. They are only meaningful for the
/// `World` that issued them, and only while their generation matches the slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// Returns the raw slot index. Useful for diagnostics, not for lookups.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Returns the generation the handle was issued with.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    generation: u32,
    occupied: bool,
}

/// Hands out entity slots and recycles them through a free list.
pub(crate) struct EntityAllocator {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    alive: usize,
}

impl EntityAllocator {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            alive: 0,
        }
    }

    /// Allocates a slot, reusing the most recently freed one when possible.
    pub(crate) fn allocate(&mut self) -> Entity {
        self.alive += 1;
        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.occupied = true;
            Entity {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                occupied: true,
            });
            Entity {
                index,
                generation: 0,
            }
        }
    }

    /// Frees the slot behind `entity`. Returns `false` if the handle was
    /// already stale, in which case nothing changes.
    pub(crate) fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let slot = &mut self.slots[entity.index as usize];
        slot.occupied = false;
        self.alive -= 1;
        // A slot that has used up its generations is retired, never reused.
        if let Some(next) = slot.generation.checked_add(1) {
            slot.generation = next;
            self.free_list.push(entity.index);
        }
        true
    }

    pub(crate) fn is_alive(&self, entity: Entity) -> bool {
        self.slots
            .get(entity.index as usize)
            .is_some_and(|slot| slot.occupied && slot.generation == entity.generation)
    }

    /// The live handle currently occupying `index`, if any.
    pub(crate) fn entity_at(&self, index: u32) -> Option<Entity> {
        let slot = self.slots.get(index as usize)?;
        slot.occupied.then_some(Entity {
            index,
            generation: slot.generation,
        })
    }

    /// Every live handle, in slot order.
    pub(crate) fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.occupied)
            .map(|(index, slot)| Entity {
                index: index as u32,
                generation: slot.generation,
            })
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.alive
    }

    #[cfg(any(feature = "diagnostics", test))]
    pub(crate) fn free_count(&self) -> usize {
        self.free_list.len()
    }

    #[cfg(any(feature = "diagnostics", test))]
    pub(crate) fn total_slots(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sequential() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let e1 = alloc.allocate();
        assert_eq!((e0.index, e0.generation), (0, 0));
        assert_eq!((e1.index, e1.generation), (1, 0));
        assert_eq!(alloc.alive_count(), 2);
    }

    #[test]
    fn recycled_slot_gets_new_generation() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        assert!(alloc.deallocate(e0));
        let e1 = alloc.allocate();
        assert_eq!(e1.index, 0);
        assert_eq!(e1.generation, 1);
        assert!(!alloc.is_alive(e0));
        assert!(alloc.is_alive(e1));
        assert_eq!(alloc.total_slots(), 1);
    }

    #[test]
    fn double_deallocate_is_noop() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        assert!(alloc.deallocate(e));
        assert!(!alloc.deallocate(e));
        assert_eq!(alloc.alive_count(), 0);
        assert_eq!(alloc.free_count(), 1);
    }

    #[test]
    fn unissued_generation_is_not_alive() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        alloc.deallocate(e);
        let forged = Entity {
            index: e.index,
            generation: e.generation + 1,
        };
        assert!(!alloc.is_alive(forged));
        assert_eq!(alloc.entity_at(e.index), None);
    }

    #[test]
    fn exhausted_slot_is_retired() {
        let mut alloc = EntityAllocator::new();
        let first = alloc.allocate();
        alloc.slots[0].generation = u32::MAX;
        let last = Entity {
            index: first.index,
            generation: u32::MAX,
        };
        assert!(alloc.is_alive(last));
        assert!(alloc.deallocate(last));
        assert!(!alloc.is_alive(last));
        assert_eq!(alloc.free_count(), 0);

        let next = alloc.allocate();
        assert_eq!(next.index, 1);
        assert!(!alloc.is_alive(first));
        assert!(!alloc.is_alive(Entity { index: 0, generation: 0 }));
        assert_eq!(alloc.alive_count(), 1);
        assert_eq!(alloc.total_slots(), 2);
    }

    #[test]
    fn iter_alive_skips_free_slots() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        let c = alloc.allocate();
        alloc.deallocate(b);
        let alive: Vec<Entity> = alloc.iter_alive().collect();
        assert_eq!(alive, vec![a, c]);
        assert_eq!(alloc.entity_at(c.index), Some(c));
    }

    #[test]
    fn display_format() {
        let e = Entity {
            index: 3,
            generation: 2,
        };
        assert_eq!(format!("{e}"), "3v2");
        assert_eq!(format!("{e:?}"), "Entity(3v2)");
    }
}
