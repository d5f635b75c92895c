//! Core engine types and utilities for the Sky Base simulation.
//!
//! This crate provides the foundational types used across all simulation systems:
//! - Transform and spatial components
//! - Axis-aligned bounds
//! - Fixed-step time management
//! - Common component types for ECS

pub mod bounds;
pub mod components;
pub mod time;
pub mod transform;

pub use bounds::*;
pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{EulerRot, Mat4, Quat, Vec3};
pub use hecs::{Entity, World};
