//! Random spatial sampling helpers.

use engine_core::{Quat, Vec3};
use rand::Rng;
use std::f32::consts::TAU;

/// Uniform point inside the unit sphere.
pub fn inside_unit_sphere<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let p = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Uniformly distributed rotation (Shoemake's method).
pub fn random_rotation<R: Rng>(rng: &mut R) -> Quat {
    let u1: f32 = rng.gen();
    let u2: f32 = rng.gen::<f32>() * TAU;
    let u3: f32 = rng.gen::<f32>() * TAU;
    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();
    Quat::from_xyzw(a * u2.sin(), a * u2.cos(), b * u3.sin(), b * u3.cos()).normalize()
}
