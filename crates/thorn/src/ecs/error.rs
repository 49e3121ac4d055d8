use thiserror::Error;

use super::entity::Entity;
use super::guid::Guid;

/// Failures reported by [`World`](super::World) and hierarchy operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcsError {
    #[error("entity {0} is not alive")]
    InvalidHandle(Entity),

    #[error("no live entity is bound to guid {0}")]
    GuidNotFound(Guid),

    #[error("entity {0} has no Transform")]
    MissingTransform(Entity),

    #[error("parenting {child} under {parent} would create a cycle")]
    CycleRejected { child: Entity, parent: Entity },

    #[error("hierarchy cycle detected at entity {0}")]
    CycleDetected(Entity),
}
