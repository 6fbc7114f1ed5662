//! Viewer data structures: geometry, materials, textures, lights, instances
//! and the scene graph.
//!
//! - `geometry` holds indexed CPU geometry and the procedural shape generators
//! - `texture` rebuilds model textures and uploads them
//! - `material` describes surface colour, opacity and texture
//! - `light` describes model lights and their shadow settings
//! - `instance` holds per-node transformation data
//! - `instanced` provides the fixed-capacity tendon pools
//! - `scene_graph` is the arena of scene nodes

pub mod geometry;
pub mod instance;
pub mod instanced;
pub mod light;
pub mod material;
pub mod scene_graph;
pub mod texture;
