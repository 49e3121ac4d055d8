//! Per-frame event queue.
//!
//! Game code pushes events at any time. [`EventQueue::drain`] hands them to a
//! handler once per frame in arrival order. Events raised while draining go
//! to the back of the queue and are delivered on the next frame, so handlers
//! never nest.

use std::collections::VecDeque;

use serde_json::Value;

use crate::ecs::Entity;

/// A named notification about one entity, with an optional payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityEvent {
    pub entity: Entity,
    pub name: String,
    pub payload: Value,
}

impl EntityEvent {
    pub fn new(entity: Entity, name: impl Into<String>) -> Self {
        Self {
            entity,
            name: name.into(),
            payload: Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// FIFO queue of events of type `E`.
#[derive(Debug)]
pub struct EventQueue<E> {
    pending: VecDeque<E>,
}

impl<E> EventQueue<E> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    pub fn push(&mut self, event: E) {
        self.pending.push_back(event);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Delivers every event queued before the call, oldest first.
    ///
    /// The handler may push follow-up events through the queue it is given;
    /// they wait for the next drain. Returns the number delivered.
    pub fn drain(&mut self, mut handler: impl FnMut(E, &mut EventQueue<E>)) -> usize {
        let batch = std::mem::take(&mut self.pending);
        let delivered = batch.len();
        for event in batch {
            handler(event, self);
        }
        delivered
    }

    /// Drops every pending event.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
