//! Level switching on top of the scene format.
//!
//! A level is one scene file that owns the whole world. [`LevelLoader`]
//! replaces the current level in two non-interleaved phases: the new file is
//! read and validated first, and only when that succeeds is the old level
//! torn down and the new one committed. A failed load leaves the previous
//! level exactly as it was.
//!
//! Every operation reports success as a `bool` and logs the reason for a
//! failure, so a host can surface it without matching on error types.

use std::path::{Path, PathBuf};

use crate::ecs::World;
use crate::ecs::hierarchy::propagate_transforms;
use crate::scene::{SceneRegistry, read_scene_file, save_scene_to_file};

#[derive(Debug, Default)]
pub struct LevelLoader {
    current_file: Option<PathBuf>,
}

impl LevelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// File the current level was loaded from or last saved to.
    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Replaces the current level with the one stored at `path`.
    pub fn load_level(
        &mut self,
        world: &mut World,
        registry: &SceneRegistry,
        path: impl AsRef<Path>,
    ) -> bool {
        let path = path.as_ref();
        let decoded = match read_scene_file(path).and_then(|data| registry.decode(&data)) {
            Ok(decoded) => decoded,
            Err(err) => {
                log::error!("failed to load level {}: {err}", path.display());
                return false;
            }
        };

        self.unload_level(world);
        let entities = decoded.commit(world);
        let stats = propagate_transforms(world);
        self.current_file = Some(path.to_path_buf());
        log::info!(
            "loaded level {} ({} entities, {} resolved transforms)",
            path.display(),
            entities.len(),
            stats.resolved
        );
        true
    }

    pub fn save_level(
        &mut self,
        world: &World,
        registry: &SceneRegistry,
        path: impl AsRef<Path>,
    ) -> bool {
        let path = path.as_ref();
        match save_scene_to_file(world, registry, path) {
            Ok(()) => {
                self.current_file = Some(path.to_path_buf());
                log::info!("saved level {} ({} entities)", path.display(), world.entity_count());
                true
            }
            Err(err) => {
                log::error!("failed to save level {}: {err}", path.display());
                false
            }
        }
    }

    /// Saves back to [`current_file`](Self::current_file).
    pub fn save_current(&mut self, world: &World, registry: &SceneRegistry) -> bool {
        let Some(path) = self.current_file.clone() else {
            log::warn!("no current level file to save to");
            return false;
        };
        self.save_level(world, registry, path)
    }

    /// Destroys every entity. The guid registry is cleared before any entity
    /// goes away, so nothing resolves a guid into a half-destroyed level.
    pub fn unload_level(&mut self, world: &mut World) {
        let count = world.entity_count();
        world.delete_all_entities();
        if let Some(path) = self.current_file.take() {
            log::info!("unloaded level {} ({count} entities)", path.display());
        }
    }
}
