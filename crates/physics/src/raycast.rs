//! Raycasting for obstacle sensing.

use crate::{CollisionWorld, ColliderTag};
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
}

/// A ray hit reduced to what the simulation cares about.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedHit {
    pub tag: ColliderTag,
    pub distance: f32,
    pub point: Vec3,
}

/// Anything that can answer "what does this ray hit first?".
pub trait SpatialQuery {
    /// Cast a ray and return the nearest tagged hit within `max_distance`.
    /// `direction` need not be normalized.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<TaggedHit>;
}

impl CollisionWorld {
    /// Cast a ray and return the first hit.
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RaycastHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        let filter = QueryFilter::default();

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                filter,
            )
            .map(|(collider, time_of_impact)| {
                let point = ray.point_at(time_of_impact);
                RaycastHit {
                    collider,
                    distance: time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                }
            })
    }
}

impl SpatialQuery for CollisionWorld {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<TaggedHit> {
        self.raycast(origin, direction, max_distance).map(|hit| TaggedHit {
            // Untagged geometry is treated as debris.
            tag: self.tag_of(hit.collider).unwrap_or(ColliderTag::Debris),
            distance: hit.distance,
            point: hit.point,
        })
    }
}

/// Distance along a normalized ray to the surface of a sphere, if it is hit
/// within `max_distance`. A ray starting inside the sphere hits at 0.
pub fn ray_sphere(origin: Vec3, direction: Vec3, max_distance: f32, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center - origin;
    let radius_sq = radius * radius;
    if to_center.length_squared() <= radius_sq {
        return Some(0.0);
    }

    let along = to_center.dot(direction);
    if along < 0.0 {
        return None;
    }
    let closest_sq = to_center.length_squared() - along * along;
    if closest_sq > radius_sq {
        return None;
    }
    let t = along - (radius_sq - closest_sq).sqrt();
    (t <= max_distance).then_some(t)
}
