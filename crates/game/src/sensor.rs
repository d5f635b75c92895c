//! Two-ray forward obstacle sensor.

use engine_core::{Entity, Transform, Vec3};
use physics::{ray_sphere, ColliderTag, SpatialQuery, TaggedHit};

pub const RAY_OFFSET: f32 = 15.0;
pub const RAY_LENGTH: f32 = 200.0;
/// Collision radius of an enemy ship as seen by other ships' sensors.
pub const SHIP_RADIUS: f32 = 10.0;

/// Which ray saw the obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvoidSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvoidInfo {
    #[default]
    None,
    Obstacle { tag: ColliderTag, side: AvoidSide },
}

#[derive(Debug, Clone, Copy)]
pub struct ObstacleSensor {
    pub ray_offset: f32,
    pub ray_length: f32,
}

impl Default for ObstacleSensor {
    fn default() -> Self {
        Self {
            ray_offset: RAY_OFFSET,
            ray_length: RAY_LENGTH,
        }
    }
}

impl ObstacleSensor {
    /// Cast both rays along the ship's heading. The left ray is checked first
    /// and wins when both hit.
    pub fn check(&self, transform: &Transform, query: &dyn SpatialQuery) -> AvoidInfo {
        let forward = transform.forward();
        let offset = transform.right() * self.ray_offset;

        let rays = [
            (AvoidSide::Left, transform.position - offset),
            (AvoidSide::Right, transform.position + offset),
        ];
        for (side, origin) in rays {
            if let Some(hit) = query.cast_ray(origin, forward, self.ray_length) {
                return AvoidInfo::Obstacle { tag: hit.tag, side };
            }
        }
        AvoidInfo::None
    }
}

/// Static geometry plus the other enemy ships, as one query.
pub struct SceneQuery<'a> {
    pub statics: &'a dyn SpatialQuery,
    pub ships: &'a [(Entity, Vec3)],
    /// The querying ship, never reported as its own obstacle.
    pub skip: Option<Entity>,
}

impl SpatialQuery for SceneQuery<'_> {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<TaggedHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let mut nearest = self.statics.cast_ray(origin, direction, max_distance);
        for &(entity, center) in self.ships {
            if Some(entity) == self.skip {
                continue;
            }
            let Some(distance) = ray_sphere(origin, direction, max_distance, center, SHIP_RADIUS) else {
                continue;
            };
            if nearest.map_or(true, |hit| distance < hit.distance) {
                nearest = Some(TaggedHit {
                    tag: ColliderTag::EnemyShip,
                    distance,
                    point: origin + direction * distance,
                });
            }
        }
        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Boxes;
    use engine_core::Aabb;

    fn wall_ahead(tag: ColliderTag, x_min: f32, x_max: f32) -> (Aabb, ColliderTag) {
        (
            Aabb::new(Vec3::new(x_min, -50.0, -110.0), Vec3::new(x_max, 50.0, -100.0)),
            tag,
        )
    }

    #[test]
    fn clear_space_reports_nothing() {
        let sensor = ObstacleSensor::default();
        let info = sensor.check(&Transform::default(), &Boxes(vec![]));
        assert_eq!(info, AvoidInfo::None);
    }

    #[test]
    fn left_ray_wins_when_both_hit() {
        let sensor = ObstacleSensor::default();
        let scene = Boxes(vec![wall_ahead(ColliderTag::Debris, -100.0, 100.0)]);
        assert_eq!(
            sensor.check(&Transform::default(), &scene),
            AvoidInfo::Obstacle {
                tag: ColliderTag::Debris,
                side: AvoidSide::Left
            }
        );
    }

    #[test]
    fn right_only_hit_reports_right() {
        let sensor = ObstacleSensor::default();
        let scene = Boxes(vec![wall_ahead(ColliderTag::Outpost, 10.0, 40.0)]);
        assert_eq!(
            sensor.check(&Transform::default(), &scene),
            AvoidInfo::Obstacle {
                tag: ColliderTag::Outpost,
                side: AvoidSide::Right
            }
        );
    }

    #[test]
    fn obstacle_beyond_ray_length_is_ignored() {
        let sensor = ObstacleSensor::default();
        let far = (
            Aabb::new(Vec3::new(-100.0, -50.0, -400.0), Vec3::new(100.0, 50.0, -300.0)),
            ColliderTag::Debris,
        );
        assert_eq!(sensor.check(&Transform::default(), &Boxes(vec![far])), AvoidInfo::None);
    }

    #[test]
    fn scene_query_sees_other_ships_but_not_itself() {
        let mut world = hecs::World::new();
        let me = world.spawn(());
        let other = world.spawn(());
        let statics = Boxes(vec![]);
        let ships = [(me, Vec3::ZERO), (other, Vec3::new(-15.0, 0.0, -60.0))];
        let scene = SceneQuery {
            statics: &statics,
            ships: &ships,
            skip: Some(me),
        };

        let info = ObstacleSensor::default().check(&Transform::default(), &scene);
        assert_eq!(
            info,
            AvoidInfo::Obstacle {
                tag: ColliderTag::EnemyShip,
                side: AvoidSide::Left
            }
        );
    }

    #[test]
    fn scene_query_returns_nearest() {
        let mut world = hecs::World::new();
        let other = world.spawn(());
        let statics = Boxes(vec![wall_ahead(ColliderTag::Debris, -50.0, 50.0)]);
        let ships = [(other, Vec3::new(0.0, 0.0, -150.0))];
        let scene = SceneQuery {
            statics: &statics,
            ships: &ships,
            skip: None,
        };
        let hit = scene.cast_ray(Vec3::ZERO, Vec3::NEG_Z, 200.0);
        assert_eq!(hit.map(|h| h.tag), Some(ColliderTag::Debris));
    }
}
