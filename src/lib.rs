//! mjviewer
//!
//! Scene construction and interactive controls for a WASM-first viewer of
//! physics simulations. The physics engine is external and reached through
//! the traits in [`physics`]; this crate turns its struct-of-arrays model
//! into a renderable scene graph, keeps that graph in step with the
//! simulation and exposes the viewer's keyboard and panel controls.
//!
//! High-level modules
//! - `swizzle`: conversion between the physics and render axis conventions
//! - `physics`: model description and the engine/simulation/filesystem traits
//! - `data_structures`: geometry, instances, textures, materials, lights,
//!   instanced pools and the scene graph arena
//! - `builder`: model to scene graph translation
//! - `sync`: per-frame stepping, control noise, pose and tendon updates
//! - `controls`: commands, key bindings and the control panel model
//! - `context`: the viewer context owning model, simulation and scene
//! - `resources`: asset prefetch and GPU upload of a built scene
//! - `config`, `camera`: viewer settings and the free camera
//! - `web` (wasm32 only): DOM overlays, keyboard wiring and [`web::launch`]
//!

pub mod builder;
pub mod camera;
pub mod config;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod physics;
pub mod resources;
pub mod swizzle;
pub mod sync;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

// Re-exports commonly used types for convenience in downstream code.
pub use builder::{BuiltScene, build_scene};
pub use config::{Params, ViewerConfig};
pub use context::ViewerContext;
pub use controls::Command;
pub use physics::{Model, PhysicsEngine, Simulation};

/// Install the platform logger. Safe to call more than once.
pub fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            log::debug!("Logger already initialized: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::debug!("Logger already initialized");
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    init_logging();
    log::info!("mjviewer loaded");
}
