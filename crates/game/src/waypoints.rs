//! Engagement waypoints around the player ship.
//!
//! The cloud is generated once at game start in the player's local frame and
//! resolved against the player transform on every lookup, so it travels with
//! the ship. Enemies only hold [`WaypointId`]s into the pool.

use engine_core::{Aabb, Transform, Vec3};
use rand::Rng;

use crate::config::WaypointConfig;
use crate::sampling::inside_unit_sphere;

/// Index of a waypoint in the [`WaypointPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WaypointId(u32);

impl WaypointId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a waypoint was placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaypointSource {
    /// Clear of every exclusion volume.
    Sampled,
    /// Retries ran out; the least-intersecting candidate was kept.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Waypoint {
    /// Position in the player ship's local frame.
    pub position: Vec3,
    pub source: WaypointSource,
}

#[derive(Debug, Clone, Default)]
pub struct WaypointPool {
    waypoints: Vec<Waypoint>,
}

impl WaypointPool {
    /// Rejection-sample `count` waypoints inside the configured ellipsoid,
    /// keeping them out of `exclusion` (player-local bounds of ship parts).
    pub fn generate<R: Rng>(count: usize, layout: &WaypointConfig, exclusion: &[Aabb], rng: &mut R) -> Self {
        let shift = Vec3::from_array(layout.shift);
        let scale = Vec3::new(layout.width_scale, layout.height_scale, 1.0) * layout.radius;
        let attempts = layout.max_attempts.max(1);

        let mut waypoints = Vec::with_capacity(count);
        let mut fallbacks = 0usize;
        for _ in 0..count {
            let mut best: Option<(Vec3, f32)> = None;
            let mut placed = None;
            for _ in 0..attempts {
                let candidate = inside_unit_sphere(rng) * scale + shift;
                let penetration: f32 = exclusion.iter().map(|b| b.penetration_depth(candidate)).sum();
                if !exclusion.iter().any(|b| b.contains(candidate)) {
                    placed = Some(candidate);
                    break;
                }
                if best.map_or(true, |(_, depth)| penetration < depth) {
                    best = Some((candidate, penetration));
                }
            }

            let waypoint = match (placed, best) {
                (Some(position), _) => Waypoint {
                    position,
                    source: WaypointSource::Sampled,
                },
                (None, Some((position, _))) => {
                    fallbacks += 1;
                    Waypoint {
                        position,
                        source: WaypointSource::Fallback,
                    }
                }
                (None, None) => Waypoint {
                    position: shift,
                    source: WaypointSource::Fallback,
                },
            };
            waypoints.push(waypoint);
        }

        if fallbacks > 0 {
            log::warn!(
                "{} of {} waypoints fell back to the least-intersecting candidate after {} attempts",
                fallbacks,
                count,
                attempts
            );
        }
        log::info!("Generated {} waypoints", waypoints.len());
        Self { waypoints }
    }

    /// Draw `size` distinct waypoint ids without replacement. Asking for more
    /// than the pool holds yields the whole pool in random order.
    pub fn assign<R: Rng>(&self, size: usize, rng: &mut R) -> Vec<WaypointId> {
        let amount = size.min(self.waypoints.len());
        rand::seq::index::sample(rng, self.waypoints.len(), amount)
            .into_iter()
            .map(|i| WaypointId(i as u32))
            .collect()
    }

    pub fn get(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.get(id.index())
    }

    /// Resolve a waypoint against the current player frame.
    pub fn world_position(&self, id: WaypointId, frame: &Transform) -> Option<Vec3> {
        self.get(id).map(|w| frame.transform_point(w.position))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}
