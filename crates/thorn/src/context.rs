//! Context: the per-game state handed to every system.
//!
//! [`Context`] bundles the [`World`], the deferred [`Commands`] queue and the
//! [`EntityEvent`] queue, and owns the frame loop. One [`Context::step`] is
//! one frame:
//!
//! ```text
//! 1. transform pass       every GlobalTransform recomputed
//! 2. systems              read globals, mutate locals, queue commands/events
//! 3. commands             destroys, re-parents and copies applied in order
//! 4. events               drained FIFO into the event handler
//! ```

use crate::ecs::hierarchy::{PropagationStats, propagate_transforms};
use crate::ecs::{Commands, Schedule, World};
use crate::event::{EntityEvent, EventQueue};

/// Handler invoked for each [`EntityEvent`] during the drain phase.
pub type EventHandler =
    Box<dyn FnMut(EntityEvent, &mut World, &mut Commands, &mut EventQueue<EntityEvent>)>;

/// What happened during one [`Context::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub frame: u64,
    pub propagation: PropagationStats,
    pub commands_applied: usize,
    pub events_dispatched: usize,
}

pub struct Context {
    pub world: World,
    pub commands: Commands,
    pub events: EventQueue<EntityEvent>,
    frame: u64,
    event_handler: Option<EventHandler>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            commands: Commands::new(),
            events: EventQueue::new(),
            frame: 0,
            event_handler: None,
        }
    }

    /// Number of completed frames.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn set_event_handler(
        &mut self,
        handler: impl FnMut(EntityEvent, &mut World, &mut Commands, &mut EventQueue<EntityEvent>)
        + 'static,
    ) {
        self.event_handler = Some(Box::new(handler));
    }

    /// Queues an event for delivery at the end of the current frame.
    pub fn emit(&mut self, event: EntityEvent) {
        self.events.push(event);
    }

    /// Runs one frame.
    pub fn step(&mut self, schedule: &mut Schedule) -> FrameReport {
        let propagation = propagate_transforms(&mut self.world);
        schedule.run(self);
        let commands_applied = self.commands.apply(&mut self.world);

        let events_dispatched = match self.event_handler.as_mut() {
            Some(handler) => {
                let world = &mut self.world;
                let commands = &mut self.commands;
                self.events
                    .drain(|event, queue| handler(event, &mut *world, &mut *commands, queue))
            }
            None => {
                let dropped = self.events.len();
                if dropped > 0 {
                    log::debug!("no event handler installed; dropped {dropped} events");
                }
                self.events.clear();
                0
            }
        };

        let report = FrameReport {
            frame: self.frame,
            propagation,
            commands_applied,
            events_dispatched,
        };
        log::trace!("frame {} done: {report:?}", self.frame);
        self.frame += 1;
        report
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
