//! Convenience re-exports: `use thorn::prelude::*` for the common items.

pub use crate::context::{Context, EventHandler, FrameReport};
pub use crate::ecs::{
    Command, Commands, EcsError, Entity, GlobalTransform, Guid, Parent, PropagationStats,
    Schedule, System, World, propagate_transforms,
};
pub use crate::event::{EntityEvent, EventQueue};
pub use crate::level::LevelLoader;
pub use crate::math::{Mat3, Transform, Vec2, Vec3};
pub use crate::scene::{SceneData, SceneEntity, SceneError, SceneRegistry, TransformNode};

#[cfg(feature = "diagnostics")]
pub use crate::ecs::EntityPoolStats;
