//! Deferred structural changes.
//!
//! Systems that iterate entities cannot destroy or re-parent them mid-loop.
//! They push a [`Command`] instead, and [`Commands::apply`] replays the queue
//! in FIFO order at the frame's safe point, after every system has run.

use std::collections::VecDeque;

use super::entity::Entity;
use super::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Destroy(Entity),
    DestroyRecursive(Entity),
    SetParent {
        child: Entity,
        parent: Option<Entity>,
    },
    Copy(Entity),
    DuplicateRecursive(Entity),
}

/// FIFO queue of pending [`Command`]s.
#[derive(Debug, Default)]
pub struct Commands {
    queue: VecDeque<Command>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    pub fn destroy(&mut self, entity: Entity) {
        self.push(Command::Destroy(entity));
    }

    pub fn destroy_recursive(&mut self, entity: Entity) {
        self.push(Command::DestroyRecursive(entity));
    }

    pub fn set_parent(&mut self, child: Entity, parent: Option<Entity>) {
        self.push(Command::SetParent { child, parent });
    }

    pub fn copy(&mut self, entity: Entity) {
        self.push(Command::Copy(entity));
    }

    pub fn duplicate_recursive(&mut self, entity: Entity) {
        self.push(Command::DuplicateRecursive(entity));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Applies every queued command in order and empties the queue.
    ///
    /// A command that fails (stale handle, rejected re-parent) is logged and
    /// skipped; the rest still run. Returns how many commands succeeded.
    pub fn apply(&mut self, world: &mut World) -> usize {
        let mut applied = 0;
        while let Some(command) = self.queue.pop_front() {
            let ok = match command {
                Command::Destroy(entity) => world.destroy_entity(entity),
                Command::DestroyRecursive(entity) => world.destroy_recursive(entity),
                Command::SetParent { child, parent } => match world.set_parent(child, parent) {
                    Ok(()) => true,
                    Err(err) => {
                        log::warn!("deferred set_parent failed: {err}");
                        false
                    }
                },
                Command::Copy(entity) => match world.copy(entity) {
                    Ok(_) => true,
                    Err(err) => {
                        log::warn!("deferred copy failed: {err}");
                        false
                    }
                },
                Command::DuplicateRecursive(entity) => match world.duplicate_recursive(entity) {
                    Ok(_) => true,
                    Err(err) => {
                        log::warn!("deferred duplicate failed: {err}");
                        false
                    }
                },
            };
            if ok {
                applied += 1;
            } else {
                log::debug!("skipped command {command:?}");
            }
        }
        applied
    }
}
