//! # Thorn: 2D Entity and Transform Core
//!
//! Entity lifetime, a parent/child transform hierarchy with cached world
//! matrices, and JSON scene save/load that keeps hierarchies intact by
//! writing stable guids instead of handles.
//!
//! Start with `use thorn::prelude::*`, create a [`Context`](context::Context)
//! and call [`step`](context::Context::step) once per frame.

pub mod context;
pub mod ecs;
pub mod event;
pub mod level;
pub mod math;
pub mod prelude;
pub mod scene;
