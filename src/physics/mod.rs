//! Boundary to the external physics engine.
//!
//! The engine itself (model compilation, stepping, state arrays) is not part
//! of this crate. It is reached through three small traits:
//!
//! - [`PhysicsEngine`] loads a [`Model`] from its virtual filesystem and
//!   creates simulations for it
//! - [`Simulation`] exposes the per-step state arrays the viewer reads and
//!   writes
//! - [`VirtualFs`] is the engine's in-memory filesystem into which scene
//!   files are staged before loading
//!
//! Bindings to a concrete engine implement these traits. [`MemoryFs`] is a
//! plain in-memory [`VirtualFs`] for engines that accept pre-staged files.

pub mod model;
pub mod vfs;

pub use model::{GeomType, Model};
pub use vfs::{FileContents, MemoryFs, VirtualFs};

/// Per-step simulation state of one loaded model.
///
/// Vector-valued arrays are flat, 3 floats per entry, quaternions 4 floats in
/// `(w, x, y, z)` order, all in physics coordinates.
pub trait Simulation {
    /// Advance the simulation by one timestep.
    fn step(&mut self);

    /// Recompute derived quantities (poses, tendon paths) without stepping.
    fn forward(&mut self);

    /// Restore the initial state.
    fn reset_data(&mut self);

    fn qpos_mut(&mut self) -> &mut [f64];

    fn ctrl(&self) -> &[f64];

    fn ctrl_mut(&mut self) -> &mut [f64];

    /// World positions of all bodies.
    fn xpos(&self) -> &[f64];

    /// World orientations of all bodies.
    fn xquat(&self) -> &[f64];

    fn light_xpos(&self) -> &[f64];

    fn light_xdir(&self) -> &[f64];

    /// First wrap point of each tendon.
    fn ten_wrapadr(&self) -> &[i32];

    /// Number of wrap points of each tendon.
    fn ten_wrapnum(&self) -> &[i32];

    /// World positions of all tendon wrap points.
    fn wrap_xpos(&self) -> &[f64];
}

/// The physics engine as seen by the viewer.
pub trait PhysicsEngine {
    type Sim: Simulation;

    /// Load a model from a path inside the engine's virtual filesystem.
    fn load_model(&mut self, path: &str) -> anyhow::Result<Model>;

    /// Create a fresh simulation for `model`.
    fn create_simulation(&mut self, model: &Model) -> anyhow::Result<Self::Sim>;

    /// The filesystem the engine loads models from.
    fn fs(&mut self) -> &mut dyn VirtualFs;
}
