//! Shared fixtures for unit tests.

use engine_core::{Aabb, Entity, Hull, Quat, Transform, Vec3};
use physics::{ColliderTag, SpatialQuery, TaggedHit};

use crate::combat::ShieldRegen;
use crate::config::SimConfig;
use crate::player::PlayerShip;
use crate::sim::Simulation;
use crate::spawner::SpawnEnv;

/// Tagged boxes answered by a slab test. Stands in for the collision world.
pub struct Boxes(pub Vec<(Aabb, ColliderTag)>);

impl SpatialQuery for Boxes {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<TaggedHit> {
        let direction = direction.normalize_or_zero();
        self.0
            .iter()
            .filter_map(|(b, tag)| {
                b.ray_intersection(origin, direction, max_distance).map(|distance| TaggedHit {
                    tag: *tag,
                    distance,
                    point: origin + direction * distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Seeded and sane: nobody goes mad.
pub fn quiet_config() -> SimConfig {
    SimConfig {
        seed: Some(42),
        madness_chance: 0.0,
        ..SimConfig::default()
    }
}

/// A started simulation around a stock mothership at the origin, in empty space.
pub fn simulation(config: SimConfig) -> Simulation {
    let player = PlayerShip::mothership(Transform::default());
    let mut sim = Simulation::new(config, player, Box::new(Boxes(vec![]))).expect("valid config");
    sim.start();
    sim
}

/// Spawn one enemy with exact hull stats, bypassing the per-tick spawner.
pub fn spawn_enemy_of(sim: &mut Simulation, max_health: f32, max_shield: f32, position: Vec3) -> Entity {
    let env = SpawnEnv {
        player: &sim.player,
        types: &sim.enemy_types,
        waypoints: &sim.waypoints,
        gunnery: &sim.config.gunnery,
    };
    let entity = sim
        .spawner
        .spawn_enemy(&mut sim.world, &env, position, Quat::IDENTITY, None, &mut sim.rng)
        .expect("every type is defined");

    let hull = Hull::new(max_health, max_shield);
    sim.world
        .insert(entity, (hull, ShieldRegen::new(&hull)))
        .expect("just spawned");
    sim.admit(entity);
    entity
}
