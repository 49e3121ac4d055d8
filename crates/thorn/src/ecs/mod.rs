//! # Entity Store and Transform Hierarchy
//!
//! A small sparse-set ECS built around one job: keeping a parent/child
//! transform forest consistent while entities come and go.
//!
//! ## Module Overview
//!
//! - [`entity`]: generational handles and the slot allocator
//! - [`guid`]: stable identifiers that survive save/load
//! - [`component`]: typed, cloneable per-type tables
//! - [`world`]: the entity store (create, destroy, copy, components)
//! - [`hierarchy`]: parent links, levels and the transform pass
//! - [`commands`]: structural changes deferred to the end of a frame
//! - [`system`]: the system trait and schedule runner
//! - [`error`]: the error taxonomy

pub mod commands;
pub(crate) mod component;
pub mod entity;
pub mod error;
pub mod guid;
pub mod hierarchy;
pub mod system;
pub mod world;

pub use commands::{Command, Commands};
pub use component::Component;
pub use entity::Entity;
pub use error::EcsError;
pub use guid::Guid;
pub use hierarchy::{GlobalTransform, Parent, PropagationStats, propagate_transforms};
pub use system::{Schedule, System};
pub use world::{SpawnBundle, World};

#[cfg(feature = "diagnostics")]
pub use world::EntityPoolStats;
