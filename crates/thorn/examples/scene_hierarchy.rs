//! Entity hierarchies: a headless solar system.
//!
//! Planets orbit the sun and moons orbit their planet purely through parent
//! rotation. Every 60 frames the outermost planet is destroyed together with
//! its moons through the deferred command queue, and a `destroyed` event is
//! raised for it.
//!
//! Run with: `RUST_LOG=info cargo run -p thorn --example scene_hierarchy`

use thorn::prelude::*;

#[derive(Clone)]
struct Orbit {
    degrees_per_frame: f32,
}

#[derive(Clone)]
struct Name(&'static str);

fn main() {
    env_logger::init();

    let mut ctx = Context::new();
    setup(&mut ctx.world);

    ctx.set_event_handler(|event, _world, _commands, _queue| {
        log::info!("event `{}` for {}", event.name, event.entity);
    });

    let mut schedule = Schedule::new();
    schedule
        .add_system(orbit_system)
        .add_system(prune_outer_planet)
        .add_system(report_positions);

    for _ in 0..180 {
        ctx.step(&mut schedule);
    }
    log::info!("{} entities left after {} frames", ctx.world.entity_count(), ctx.frame());
}

fn setup(world: &mut World) {
    let sun = world.spawn((Transform::IDENTITY, Orbit { degrees_per_frame: 0.5 }, Name("sun")));

    for (i, (name, moons)) in [("mercury", 0), ("earth", 1), ("jupiter", 3)].into_iter().enumerate() {
        let distance = 100.0 * (i as f32 + 1.0);
        let planet = world.spawn((
            Transform::from_xy(distance, 0.0),
            Orbit { degrees_per_frame: 2.0 / (i as f32 + 1.0) },
            Name(name),
        ));
        if let Err(err) = world.set_parent(planet, Some(sun)) {
            log::error!("could not attach {name}: {err}");
        }
        for m in 0..moons {
            let moon = world.spawn((
                Transform::from_xy(20.0 + 8.0 * m as f32, 0.0).with_scale(Vec2::splat(0.25)),
                Name("moon"),
            ));
            if let Err(err) = world.set_parent(moon, Some(planet)) {
                log::error!("could not attach moon to {name}: {err}");
            }
        }
    }
}

fn orbit_system(ctx: &mut Context) {
    for entity in ctx.world.entities_with::<Orbit>() {
        let Some(step) = ctx.world.get::<Orbit>(entity).map(|orbit| orbit.degrees_per_frame) else {
            continue;
        };
        if let Ok(local) = ctx.world.local_transform(entity) {
            let _ = ctx.world.set_local_rotation(entity, (local.rotation + step) % 360.0);
        }
    }
}

fn prune_outer_planet(ctx: &mut Context) {
    if ctx.frame() == 0 || ctx.frame() % 60 != 0 {
        return;
    }
    let outermost = ctx
        .world
        .entities_with::<Orbit>()
        .into_iter()
        .filter(|&entity| ctx.world.level_of(entity) == Ok(1))
        .max_by(|&a, &b| {
            let da = ctx.world.local_transform(a).map_or(0.0, |t| t.position.x);
            let db = ctx.world.local_transform(b).map_or(0.0, |t| t.position.x);
            da.total_cmp(&db)
        });
    if let Some(planet) = outermost {
        ctx.commands.destroy_recursive(planet);
        ctx.emit(EntityEvent::new(planet, "destroyed"));
    }
}

fn report_positions(ctx: &mut Context) {
    if ctx.frame() % 30 != 0 {
        return;
    }
    for entity in ctx.world.entities_with::<Name>() {
        let Some(name) = ctx.world.get::<Name>(entity).map(|name| name.0) else {
            continue;
        };
        if let Ok(global) = ctx.world.global_transform(entity) {
            log::info!(
                "frame {:>3} {name:<8} level {} at ({:>8.2}, {:>8.2}) rot {:>7.2}",
                ctx.frame(),
                global.level(),
                global.position().x,
                global.position().y,
                global.rotation()
            );
        }
    }
}
