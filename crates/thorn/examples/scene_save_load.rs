//! Scene save/load: build a small level, save it, edit the world, then
//! reload the file and show that the hierarchy comes back intact.
//!
//! Run with: `RUST_LOG=info cargo run -p thorn --example scene_save_load`

use serde::{Deserialize, Serialize};
use thorn::prelude::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Label(String);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Health {
    current: i32,
    max: i32,
}

fn main() {
    env_logger::init();

    let mut registry = SceneRegistry::new();
    registry.register::<Label>();
    registry.register_with_default(Health { current: 10, max: 10 });
    log::info!("registered components: {:?}", registry.component_names());

    let mut world = World::new();
    let house = world.spawn((Transform::from_xy(0.0, 5.0), Label("house".into())));
    let door = world.spawn((Transform::from_xy(2.0, 0.0), Label("door".into())));
    let guard = world.spawn((
        Transform::from_xy(-1.0, 0.0).with_rotation(90.0),
        Label("guard".into()),
        Health { current: 7, max: 10 },
    ));
    for (child, parent) in [(door, house), (guard, door)] {
        if let Err(err) = world.set_parent(child, Some(parent)) {
            log::error!("hierarchy setup failed: {err}");
            return;
        }
    }
    propagate_transforms(&mut world);
    print_world("before save", &world);

    let path = std::env::temp_dir().join("thorn_scene_save_load.json");
    let mut loader = LevelLoader::new();
    if !loader.save_level(&world, &registry, &path) {
        return;
    }

    // Wreck the live world: the reload must not care.
    world.destroy_recursive(house);
    world.spawn((Transform::from_xy(99.0, 99.0), Label("intruder".into())));
    print_world("after edits", &world);

    if loader.load_level(&mut world, &registry, &path) {
        print_world("after reload", &world);
    }
    if let Err(err) = std::fs::remove_file(&path) {
        log::warn!("could not remove {}: {err}", path.display());
    }
}

fn print_world(title: &str, world: &World) {
    println!("── {title} ──");
    for entity in world.entities() {
        let label = world.get::<Label>(entity).map_or("?", |label| label.0.as_str());
        let guid = world.guid_of(entity).map_or(0, Guid::value);
        let parent = world
            .parent_of(entity)
            .and_then(|parent| world.guid_of(parent))
            .map_or("-".to_string(), |guid| guid.to_string());
        match world.global_transform(entity) {
            Ok(global) => println!(
                "  {label:<8} guid {guid:<3} parent {parent:<4} global ({:.2}, {:.2}) rot {:.1}",
                global.position().x,
                global.position().y,
                global.rotation()
            ),
            Err(err) => println!("  {label:<8} guid {guid:<3} ({err})"),
        }
    }
}
