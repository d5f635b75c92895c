//! Enemy population manager.
//!
//! Keeps up to `max_enemies` regular enemies around the player. Once the cap
//! is reached, queued outpost requests are served one per tick, spawning every
//! guard of the request at once. Guards count towards the cap like any other
//! ship, so regular spawns resume only as the population drops.

use std::collections::VecDeque;

use engine_core::{Entity, Hull, Quat, Transform, Vec3, World};
use rand::prelude::*;

use crate::ai::Pilot;
use crate::combat::ShieldRegen;
use crate::config::{GunneryConfig, SpawnerConfig};
use crate::enemy::{Enemy, EnemyTypeTable};
use crate::player::PlayerShip;
use crate::pool::{ObjectPool, PoolHandle};
use crate::sampling::{inside_unit_sphere, random_rotation};
use crate::shooting::Gunnery;
use crate::waypoints::WaypointPool;

/// Guards waiting to be spawned around an outpost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutpostSpawnRequest {
    pub count: usize,
    pub location: Vec3,
}

/// Everything a spawn reads from the rest of the simulation.
pub struct SpawnEnv<'a> {
    pub player: &'a PlayerShip,
    pub types: &'a EnemyTypeTable,
    pub waypoints: &'a WaypointPool,
    pub gunnery: &'a GunneryConfig,
}

pub struct EnemySpawner {
    // ── Population ──────────────────────────────────────────────────────
    pub max_enemies: usize,
    /// Live enemies spawned here, guards included.
    active: Vec<Entity>,
    requests: VecDeque<OutpostSpawnRequest>,

    // ── Spawn geometry ──────────────────────────────────────────────────
    pub min_spawn_distance: f32,
    pub max_spawn_distance: f32,
    pub outpost_spawn_radius: f32,

    /// Engagement waypoints handed to each ship.
    pub waypoints_per_enemy: usize,
    /// Client-side ship objects.
    pool: ObjectPool,
}

impl EnemySpawner {
    pub fn new(config: &SpawnerConfig) -> Self {
        Self {
            max_enemies: config.max_enemies,
            active: Vec::with_capacity(config.max_enemies),
            requests: VecDeque::new(),
            min_spawn_distance: config.min_spawn_distance,
            max_spawn_distance: config.max_spawn_distance,
            outpost_spawn_radius: config.outpost_spawn_radius,
            waypoints_per_enemy: config.waypoints_per_enemy,
            pool: ObjectPool::with_capacity("enemies", config.max_enemies),
        }
    }

    /// Queue `count` guards around `location`. They appear on a later tick,
    /// after the regular population is full.
    pub fn request_spawn_for_outpost(&mut self, count: usize, location: Vec3) {
        self.requests.push_back(OutpostSpawnRequest { count, location });
        log::debug!("Queued {} guards at {:?}", count, location);
    }

    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active(&self) -> &[Entity] {
        &self.active
    }

    pub fn pool(&self) -> &ObjectPool {
        &self.pool
    }

    pub fn pool_mut(&mut self) -> &mut ObjectPool {
        &mut self.pool
    }

    /// Spawn at most one category of enemies this tick. Returns what was spawned.
    pub fn update<R: Rng>(&mut self, world: &mut World, env: &SpawnEnv, rng: &mut R) -> Vec<Entity> {
        let mut spawned = Vec::new();

        if self.active.len() < self.max_enemies {
            let direction = random_rotation(rng) * Vec3::NEG_Z;
            let distance = rng.gen_range(self.min_spawn_distance..=self.max_spawn_distance);
            let position = env.player.position() + direction * distance;
            let rotation = random_rotation(rng);
            spawned.extend(self.spawn_enemy(world, env, position, rotation, None, rng));
        } else if let Some(request) = self.requests.pop_front() {
            for _ in 0..request.count {
                let position = request.location + inside_unit_sphere(rng) * self.outpost_spawn_radius;
                let rotation = random_rotation(rng);
                spawned.extend(self.spawn_enemy(world, env, position, rotation, Some(request.location), rng));
            }
            log::info!("Spawned {} guards for outpost at {:?}", spawned.len(), request.location);
        }

        spawned
    }

    /// Create one enemy of a random type. `guard` makes it an outpost guard.
    pub fn spawn_enemy<R: Rng>(
        &mut self,
        world: &mut World,
        env: &SpawnEnv,
        position: Vec3,
        rotation: Quat,
        guard: Option<Vec3>,
        rng: &mut R,
    ) -> Option<Entity> {
        let kind = env.types.random_type(rng);
        let Some(props) = env.types.get(kind) else {
            log::warn!("Tried to spawn enemy type {:?} with no properties", kind);
            return None;
        };

        let enemy = Enemy::new(props, rng);
        let hull = Hull::new(props.max_health, props.max_shield);
        let waypoints = env.waypoints.assign(self.waypoints_per_enemy, rng);
        let pilot = match guard {
            Some(location) => Pilot::guarding(location, waypoints),
            None => Pilot::new(waypoints),
        };
        let gunnery = Gunnery::new(env.gunnery, env.player.random_target_part(rng));
        let regen = ShieldRegen::new(&hull);

        let handle: PoolHandle = self.pool.acquire();
        self.pool.enable_at(handle, position, rotation, Vec3::ONE);

        let transform = Transform::from_position_rotation(position, rotation);
        let entity = world.spawn((transform, enemy, hull, pilot, gunnery, regen, handle));
        self.active.push(entity);
        log::debug!("Spawned {:?} {:?} at {:?}", kind, entity, position);
        Some(entity)
    }

    /// Remove an enemy from the world and hand its ship object back.
    /// Returns false if this spawner no longer tracks it.
    pub fn retire(&mut self, world: &mut World, entity: Entity) -> bool {
        let Some(index) = self.active.iter().position(|e| *e == entity) else {
            return false;
        };
        self.active.swap_remove(index);

        if let Ok(handle) = world.get::<&PoolHandle>(entity).map(|h| *h) {
            self.pool.release(handle);
        }
        if world.despawn(entity).is_err() {
            log::warn!("Retired enemy {:?} was already gone from the world", entity);
        }
        true
    }

    /// Active enemies farther than `max_distance` from `origin`.
    pub fn out_of_range(&self, world: &World, origin: Vec3, max_distance: f32) -> Vec<Entity> {
        let max_sq = max_distance * max_distance;
        self.active
            .iter()
            .copied()
            .filter(|e| {
                world
                    .get::<&Transform>(*e)
                    .is_ok_and(|t| t.position.distance_squared(origin) > max_sq)
            })
            .collect()
    }
}
