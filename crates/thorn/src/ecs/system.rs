//! # System: Per-Frame Game Logic
//!
//! A system is any `FnMut(&mut Context)`. Systems run in insertion order once
//! per frame, after the transform pass, so they read fresh world transforms.
//! Structural changes should go through [`Context::commands`] so they land at
//! the end of the frame.

use crate::context::Context;

/// Anything that can run once per frame against a [`Context`].
pub trait System {
    fn run(&mut self, ctx: &mut Context);
}

impl<F: FnMut(&mut Context)> System for F {
    fn run(&mut self, ctx: &mut Context) {
        (self)(ctx);
    }
}

struct NamedSystem {
    #[cfg(any(feature = "diagnostics", test))]
    name: String,
    system: Box<dyn System>,
}

/// Time one system took during the last [`Schedule::run`].
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone)]
pub struct SystemTiming {
    pub name: String,
    pub duration_us: f64,
}

/// An ordered list of systems.
pub struct Schedule {
    systems: Vec<NamedSystem>,
    #[cfg(feature = "diagnostics")]
    timings: Vec<SystemTiming>,
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            #[cfg(feature = "diagnostics")]
            timings: Vec::new(),
        }
    }

    pub fn add_system<S: System + 'static>(&mut self, system: S) -> &mut Self {
        self.systems.push(NamedSystem {
            #[cfg(any(feature = "diagnostics", test))]
            name: short_system_name(std::any::type_name::<S>()),
            system: Box::new(system),
        });
        self
    }

    pub fn run(&mut self, ctx: &mut Context) {
        #[cfg(feature = "diagnostics")]
        {
            self.timings.clear();
            for named in &mut self.systems {
                let start = std::time::Instant::now();
                named.system.run(ctx);
                self.timings.push(SystemTiming {
                    name: named.name.clone(),
                    duration_us: start.elapsed().as_secs_f64() * 1_000_000.0,
                });
            }
        }
        #[cfg(not(feature = "diagnostics"))]
        {
            for named in &mut self.systems {
                named.system.run(ctx);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Per-system timings from the most recent run.
    #[cfg(feature = "diagnostics")]
    pub fn timings(&self) -> &[SystemTiming] {
        &self.timings
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

/// `game::systems::spin` → `spin`, any closure → `<closure>`.
#[cfg(any(feature = "diagnostics", test))]
fn short_system_name(full: &str) -> String {
    let name = full.rsplit("::").next().unwrap_or(full);
    if name.contains("closure") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}
