//! # Component: Per-Type Sparse Tables
//!
//! Components are plain data. Each component type gets one
//! [`ComponentTable<T>`], a `Vec<Option<T>>` indexed by entity slot. The
//! [`World`](super::world::World) owns one table per [`TypeId`] behind the
//! object-safe [`ErasedTable`] trait, which covers the operations that must
//! touch every table without knowing `T`:
//!
//! - destroying an entity clears its row in every table
//! - copying an entity clones its row into the new slot
//! - deleting the whole level clears every table
//!
//! Copy is why [`Component`] requires `Clone`: a duplicated entity gets a
//! deep, independent copy of every component.
//!
//! Rows are addressed by slot index only. Generation checks happen in the
//! `World` before any table is touched, so a table never sees a stale handle.

use std::any::{Any, type_name};

/// Marker trait for anything that can be attached to an entity.
///
/// Implemented automatically for every `Clone + Send + Sync + 'static` type.
pub trait Component: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Component for T {}

/// Storage for one component type, indexed by entity slot.
pub(crate) struct ComponentTable<T> {
    rows: Vec<Option<T>>,
    len: usize,
}

impl<T: Component> ComponentTable<T> {
    pub(crate) fn new() -> Self {
        Self {
            rows: Vec::new(),
            len: 0,
        }
    }

    /// Stores `value` in row `index`, returning the value it replaced.
    pub(crate) fn insert(&mut self, index: u32, value: T) -> Option<T> {
        let index = index as usize;
        if index >= self.rows.len() {
            self.rows.resize_with(index + 1, || None);
        }
        let old = self.rows[index].replace(value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    pub(crate) fn get(&self, index: u32) -> Option<&T> {
        self.rows.get(index as usize)?.as_ref()
    }

    pub(crate) fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.rows.get_mut(index as usize)?.as_mut()
    }

    pub(crate) fn remove(&mut self, index: u32) -> Option<T> {
        let old = self.rows.get_mut(index as usize)?.take();
        if old.is_some() {
            self.len -= 1;
        }
        old
    }

    /// Occupied rows as `(slot index, value)` pairs, in slot order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (u32, &T)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| row.as_ref().map(|value| (index as u32, value)))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> + '_ {
        self.rows
            .iter_mut()
            .enumerate()
            .filter_map(|(index, row)| row.as_mut().map(|value| (index as u32, value)))
    }
}

/// The type-independent face of a [`ComponentTable`].
pub(crate) trait ErasedTable: Send + Sync {
    fn contains(&self, index: u32) -> bool;
    fn remove_row(&mut self, index: u32);
    /// Clones row `from` into row `to`. Does nothing if `from` is empty.
    fn duplicate_row(&mut self, from: u32, to: u32);
    fn clear(&mut self);
    fn len(&self) -> usize;
    fn component_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ErasedTable for ComponentTable<T> {
    fn contains(&self, index: u32) -> bool {
        self.get(index).is_some()
    }

    fn remove_row(&mut self, index: u32) {
        self.remove(index);
    }

    fn duplicate_row(&mut self, from: u32, to: u32) {
        if let Some(value) = self.get(from).cloned() {
            self.insert(to, value);
        }
    }

    fn clear(&mut self) {
        self.rows.clear();
        self.len = 0;
    }

    fn len(&self) -> usize {
        self.len
    }

    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
