//! Static collision geometry and spatial queries using Rapier3D.
//!
//! The simulation never steps rigid bodies; Rapier is used purely as a
//! query structure over tagged colliders (debris fields, outposts).

pub mod collision;
pub mod collision_world;
pub mod raycast;

pub use collision::*;
pub use collision_world::*;
pub use raycast::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::ColliderHandle;
