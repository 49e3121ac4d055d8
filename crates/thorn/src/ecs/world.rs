//! # World: The Entity Store
//!
//! The [`World`] owns every entity slot, every component table and the guid
//! registry. Callers hold [`Entity`] handles and go through the world for
//! everything.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ World                                                │
//! │                                                      │
//! │  EntityAllocator   slots + generations + free list   │
//! │  GuidRegistry      Guid ↔ Entity, monotonic counter  │
//! │  tables            TypeId → ComponentTable<T>        │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation that takes a handle validates its generation first. A
//! stale handle never reaches a table: getters return `None`, mutators
//! return [`EcsError::InvalidHandle`], and `destroy_entity` is a no-op.

use std::any::{TypeId, type_name};
use std::collections::HashMap;

use super::component::{Component, ComponentTable, ErasedTable};
use super::entity::{Entity, EntityAllocator};
use super::error::EcsError;
use super::guid::{Guid, GuidRegistry};

/// Owns all entities and their components.
pub struct World {
    allocator: EntityAllocator,
    guids: GuidRegistry,
    tables: HashMap<TypeId, Box<dyn ErasedTable>>,
    #[cfg(feature = "diagnostics")]
    created_this_frame: u32,
    #[cfg(feature = "diagnostics")]
    destroyed_this_frame: u32,
}

impl World {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            guids: GuidRegistry::new(),
            tables: HashMap::new(),
            #[cfg(feature = "diagnostics")]
            created_this_frame: 0,
            #[cfg(feature = "diagnostics")]
            destroyed_this_frame: 0,
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────────

    /// Creates an empty entity and assigns it a fresh [`Guid`].
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        #[cfg(feature = "diagnostics")]
        {
            self.created_this_frame += 1;
        }
        match self.guids.assign(entity) {
            Some(guid) => log::trace!("created entity {entity} with guid {guid}"),
            None => log::error!("guid space exhausted; entity {entity} has no guid and will not be saved"),
        }
        entity
    }

    /// Creates an entity carrying every component in `bundle`.
    ///
    /// ```ignore
    /// let e = world.spawn((Transform::from_xy(1.0, 2.0), Velocity(3.0)));
    /// ```
    pub fn spawn<B: SpawnBundle>(&mut self, bundle: B) -> Entity {
        let entity = self.create_entity();
        bundle.insert_into(self, entity);
        entity
    }

    /// Destroys `entity` and drops all of its components.
    ///
    /// Returns `false` for an already-dead handle. Children are *not*
    /// destroyed; their parent reference simply goes stale.
    pub fn destroy_entity(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }
        for table in self.tables.values_mut() {
            table.remove_row(entity.index);
        }
        self.guids.unbind_entity(entity);
        self.allocator.deallocate(entity);
        #[cfg(feature = "diagnostics")]
        {
            self.destroyed_this_frame += 1;
        }
        log::trace!("destroyed entity {entity}");
        true
    }

    /// Creates a new entity holding a deep copy of every component of
    /// `source`, including its parent link. The copy gets its own guid.
    pub fn copy(&mut self, source: Entity) -> Result<Entity, EcsError> {
        if !self.allocator.is_alive(source) {
            return Err(EcsError::InvalidHandle(source));
        }
        let copy = self.create_entity();
        for table in self.tables.values_mut() {
            table.duplicate_row(source.index, copy.index);
        }
        log::trace!("copied entity {source} into {copy}");
        Ok(copy)
    }

    /// Destroys every entity and clears the guid registry.
    ///
    /// Every previously issued handle becomes stale. The guid counter is not
    /// reset, so guids issued afterwards never collide with old ones.
    pub fn delete_all_entities(&mut self) {
        let entities: Vec<Entity> = self.allocator.iter_alive().collect();
        self.guids.clear();
        for table in self.tables.values_mut() {
            table.clear();
        }
        for &entity in &entities {
            self.allocator.deallocate(entity);
        }
        #[cfg(feature = "diagnostics")]
        {
            self.destroyed_this_frame += entities.len() as u32;
        }
        log::debug!("deleted all {} entities", entities.len());
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    /// Every live entity, in slot order.
    pub fn entities(&self) -> Vec<Entity> {
        self.allocator.iter_alive().collect()
    }

    // ── Identity ────────────────────────────────────────────────────────

    pub fn guid_of(&self, entity: Entity) -> Option<Guid> {
        if !self.is_alive(entity) {
            return None;
        }
        self.guids.guid_of(entity)
    }

    /// Looks up the live entity bound to `guid`.
    pub fn resolve(&self, guid: Guid) -> Result<Entity, EcsError> {
        self.guids
            .resolve(guid)
            .filter(|&entity| self.is_alive(entity))
            .ok_or(EcsError::GuidNotFound(guid))
    }

    /// Rebinds `entity` to a guid read from disk. If another live entity
    /// already carried that guid it loses it.
    pub(crate) fn bind_guid(&mut self, entity: Entity, guid: Guid) {
        if let Some(previous) = self.guids.bind(guid, entity)
            && self.is_alive(previous)
        {
            log::warn!("guid {guid} moved from entity {previous} to {entity}");
        }
    }

    // ── Components ──────────────────────────────────────────────────────

    /// Attaches `component` to `entity`, replacing any existing value of
    /// the same type.
    pub fn insert<T: Component>(&mut self, entity: Entity, component: T) -> Result<(), EcsError> {
        if !self.is_alive(entity) {
            return Err(EcsError::InvalidHandle(entity));
        }
        self.insert_unchecked(entity, component);
        Ok(())
    }

    /// Stores `component` without a liveness check. Callers hold a handle
    /// they just allocated or validated.
    pub(crate) fn insert_unchecked<T: Component>(&mut self, entity: Entity, component: T) {
        self.table_or_insert::<T>().insert(entity.index, component);
    }

    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.table::<T>()?.get(entity.index)
    }

    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.table_mut::<T>()?.get_mut(entity.index)
    }

    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Detaches and returns the `T` on `entity`, if any.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.table_mut::<T>()?.remove(entity.index)
    }

    /// Every live entity carrying a `T`, in slot order.
    pub fn entities_with<T: Component>(&self) -> Vec<Entity> {
        let Some(table) = self.table::<T>() else {
            return Vec::new();
        };
        table
            .iter()
            .filter_map(|(index, _)| self.allocator.entity_at(index))
            .collect()
    }

    /// Visits every `(entity, &T)` pair.
    pub fn for_each<T: Component>(&self, mut f: impl FnMut(Entity, &T)) {
        let Some(table) = self.table::<T>() else {
            return;
        };
        for (index, value) in table.iter() {
            if let Some(entity) = self.allocator.entity_at(index) {
                f(entity, value);
            }
        }
    }

    /// Visits every `(entity, &mut T)` pair.
    pub fn for_each_mut<T: Component>(&mut self, mut f: impl FnMut(Entity, &mut T)) {
        let Some(boxed) = self.tables.get_mut(&TypeId::of::<T>()) else {
            return;
        };
        let Some(table) = boxed.as_any_mut().downcast_mut::<ComponentTable<T>>() else {
            return;
        };
        for (index, value) in table.iter_mut() {
            if let Some(entity) = self.allocator.entity_at(index) {
                f(entity, value);
            }
        }
    }

    // ── Table access ────────────────────────────────────────────────────

    fn table<T: Component>(&self) -> Option<&ComponentTable<T>> {
        self.tables
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<ComponentTable<T>>()
    }

    fn table_mut<T: Component>(&mut self) -> Option<&mut ComponentTable<T>> {
        self.tables
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<ComponentTable<T>>()
    }

    fn table_or_insert<T: Component>(&mut self) -> &mut ComponentTable<T> {
        self.tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentTable::<T>::new()))
            .as_any_mut()
            .downcast_mut::<ComponentTable<T>>()
            .unwrap_or_else(|| panic!("component table type mismatch for `{}`", type_name::<T>()))
    }

    // ── Diagnostics ─────────────────────────────────────────────────────

    /// Entity pool counters. Resets the per-frame created/destroyed tallies.
    #[cfg(feature = "diagnostics")]
    pub fn pool_stats(&mut self) -> EntityPoolStats {
        let stats = EntityPoolStats {
            alive: self.allocator.alive_count(),
            free: self.allocator.free_count(),
            total_slots: self.allocator.total_slots(),
            guids_bound: self.guids.len(),
            component_tables: self
                .tables
                .values()
                .map(|table| (short_type_name(table.component_name()), table.len()))
                .collect(),
            created_this_frame: self.created_this_frame,
            destroyed_this_frame: self.destroyed_this_frame,
        };
        self.created_this_frame = 0;
        self.destroyed_this_frame = 0;
        stats
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of the entity pool returned by [`World::pool_stats`].
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone, Default)]
pub struct EntityPoolStats {
    pub alive: usize,
    pub free: usize,
    pub total_slots: usize,
    pub guids_bound: usize,
    /// `(short component name, rows)` per table, in no particular order.
    pub component_tables: Vec<(&'static str, usize)>,
    pub created_this_frame: u32,
    pub destroyed_this_frame: u32,
}

/// Strips the module path from a type name (`thorn::math::Transform` →
/// `Transform`).
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

// ── Bundles ─────────────────────────────────────────────────────────────

/// A tuple of components inserted together by [`World::spawn`].
///
/// Implemented for tuples of up to eight components.
pub trait SpawnBundle {
    fn insert_into(self, world: &mut World, entity: Entity);
}

macro_rules! impl_spawn_bundle {
    ($($T:ident),+) => {
        impl<$($T: Component),+> SpawnBundle for ($($T,)+) {
            #[allow(non_snake_case)]
            fn insert_into(self, world: &mut World, entity: Entity) {
                let ($($T,)+) = self;
                $(world.insert_unchecked(entity, $T);)+
            }
        }
    };
}

impl_spawn_bundle!(A);
impl_spawn_bundle!(A, B);
impl_spawn_bundle!(A, B, C);
impl_spawn_bundle!(A, B, C, D);
impl_spawn_bundle!(A, B, C, D, E);
impl_spawn_bundle!(A, B, C, D, E, F);
impl_spawn_bundle!(A, B, C, D, E, F, G);
impl_spawn_bundle!(A, B, C, D, E, F, G, H);
