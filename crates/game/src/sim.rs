//! The server-side simulation loop.
//!
//! One [`Simulation::tick`] runs, in order: clock, player sample, spawner,
//! out-of-range sweep, pilots, due timers, effect lifetimes and finally the
//! sync of pooled objects to their entities.

use std::time::Duration;

use engine_core::{Entity, Hull, Time, Transform, Vec3, World};
use physics::SpatialQuery;
use rand::prelude::*;

use crate::ai::{Pilot, PilotView};
use crate::combat::DamageSource;
use crate::config::SimConfig;
use crate::enemy::{Enemy, EnemyType, EnemyTypeTable};
use crate::error::ConfigError;
use crate::player::PlayerShip;
use crate::pool::{ObjectPool, PoolHandle};
use crate::sensor::{ObstacleSensor, SceneQuery};
use crate::shooting::{predict_intercept, FireDecision, Gunnery};
use crate::spawner::{EnemySpawner, SpawnEnv};
use crate::state::{GameState, GameStatus, OutpostId};
use crate::timers::{TimerEvent, TimerQueue};
use crate::waypoints::WaypointPool;

/// Outpost resource payout range, upper bound exclusive.
const OUTPOST_RESOURCES: std::ops::Range<u32> = 100..500;

/// Things that happened during a tick, for the network layer to relay.
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    EnemySpawned {
        entity: Entity,
        kind: EnemyType,
        position: Vec3,
    },
    ShotFired {
        entity: Entity,
        origin: Vec3,
        aim: Vec3,
    },
    EnemyDestroyed {
        entity: Entity,
        source: DamageSource,
        resources: u32,
    },
    EnemyDespawned {
        entity: Entity,
    },
    WentMad {
        entity: Entity,
    },
}

pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) world: World,
    pub(crate) time: Time,
    pub(crate) rng: StdRng,
    pub(crate) timers: TimerQueue<TimerEvent>,
    pub(crate) spawner: EnemySpawner,
    pub(crate) waypoints: WaypointPool,
    pub(crate) enemy_types: EnemyTypeTable,
    pub(crate) explosions: ObjectPool,
    pub(crate) sensor: ObstacleSensor,
    pub(crate) statics: Box<dyn SpatialQuery>,
    pub(crate) player: PlayerShip,
    pub(crate) state: GameState,
    pub(crate) events: Vec<SimEvent>,
}

impl Simulation {
    /// Validate `config` and build an idle simulation around the player ship
    /// and the static scene geometry.
    pub fn new(config: SimConfig, player: PlayerShip, statics: Box<dyn SpatialQuery>) -> Result<Self, ConfigError> {
        config.validate()?;
        let enemy_types = EnemyTypeTable::from_properties(&config.enemy_types)?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut time = Time::new();
        time.set_fixed_rate(config.tick_rate);

        Ok(Self {
            spawner: EnemySpawner::new(&config.spawner),
            explosions: ObjectPool::with_capacity("explosions", config.spawner.max_enemies),
            config,
            world: World::new(),
            time,
            rng,
            timers: TimerQueue::new(),
            waypoints: WaypointPool::default(),
            enemy_types,
            sensor: ObstacleSensor::default(),
            statics,
            player,
            state: GameState::new(),
            events: Vec::new(),
        })
    }

    /// Generate the waypoint cloud and let enemies spawn.
    pub fn start(&mut self) {
        if self.state.status() != GameStatus::Waiting {
            log::warn!("start() called while {:?}", self.state.status());
            return;
        }
        let count = self.config.spawner.max_enemies * self.config.waypoints.per_enemy_factor;
        self.waypoints = WaypointPool::generate(
            count,
            &self.config.waypoints,
            &self.player.exclusion_bounds(),
            &mut self.rng,
        );
        self.state.set_status(GameStatus::Started);
        self.schedule_cleanup(self.time.elapsed());
    }

    pub fn finish(&mut self) {
        self.state.set_status(GameStatus::Finished);
    }

    /// Advance the simulation by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        self.time.advance(dt);
        let dt = self.time.delta_seconds();
        self.player.sample();

        if self.state.status() == GameStatus::Started {
            self.spawn_enemies();
            self.despawn_out_of_range();
        }
        self.run_pilots(dt);
        self.run_timers();
        self.update_effects(dt);
        self.sync_pool();
    }

    // ── Outposts ───────────────────────────────────────────────────────────

    /// Add an outpost holding a random stash and queue its guards.
    pub fn register_outpost(&mut self, location: Vec3, guards: usize) -> OutpostId {
        let resources = self.rng.gen_range(OUTPOST_RESOURCES);
        let id = self.state.add_outpost(location, resources);
        self.spawner.request_spawn_for_outpost(guards, location);
        id
    }

    pub fn collect_outpost(&mut self, id: OutpostId) -> Option<u32> {
        self.state.collect_outpost(id)
    }

    pub fn request_spawn_for_outpost(&mut self, count: usize, location: Vec3) {
        self.spawner.request_spawn_for_outpost(count, location);
    }

    // ── Accessors ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn player(&self) -> &PlayerShip {
        &self.player
    }

    /// The player ship is flown from outside; move it between ticks.
    pub fn player_mut(&mut self) -> &mut PlayerShip {
        &mut self.player
    }

    pub fn spawner(&self) -> &EnemySpawner {
        &self.spawner
    }

    pub fn waypoints(&self) -> &WaypointPool {
        &self.waypoints
    }

    pub fn explosions(&self) -> &ObjectPool {
        &self.explosions
    }

    pub fn time(&self) -> &Time {
        &self.time
    }

    pub fn time_mut(&mut self) -> &mut Time {
        &mut self.time
    }

    /// Take every event produced since the last drain.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Tick stages ────────────────────────────────────────────────────────

    fn spawn_enemies(&mut self) {
        let env = SpawnEnv {
            player: &self.player,
            types: &self.enemy_types,
            waypoints: &self.waypoints,
            gunnery: &self.config.gunnery,
        };
        let spawned = self.spawner.update(&mut self.world, &env, &mut self.rng);
        for entity in spawned {
            self.admit(entity);
        }
    }

    /// Bookkeeping for a freshly spawned enemy: tracking, timers, event.
    pub(crate) fn admit(&mut self, entity: Entity) {
        let now = self.time.elapsed();
        let Ok((transform, enemy, hull)) = self.world.query_one_mut::<(&Transform, &Enemy, &Hull)>(entity) else {
            return;
        };
        let event = SimEvent::EnemySpawned {
            entity,
            kind: enemy.kind,
            position: transform.position,
        };
        let shielded = hull.max_shield > 0.0;

        self.state.add_enemy(entity);
        self.timers.schedule_at(now, TimerEvent::ShootDecide(entity));
        if shielded {
            self.timers.schedule_at(now, TimerEvent::ShieldRecharge(entity));
        }
        self.events.push(event);
    }

    fn despawn_out_of_range(&mut self) {
        let stragglers = self.spawner.out_of_range(
            &self.world,
            self.player.position(),
            self.config.spawner.despawn_distance,
        );
        for entity in stragglers {
            if self.retire_enemy(entity) {
                log::debug!("Despawned {:?}: out of range", entity);
                self.events.push(SimEvent::EnemyDespawned { entity });
            }
        }
    }

    fn run_pilots(&mut self, dt: f32) {
        let ships: Vec<(Entity, Vec3)> = self
            .world
            .query::<(&Transform, &Enemy)>()
            .iter()
            .map(|(entity, (transform, _))| (entity, transform.position))
            .collect();

        for (entity, (transform, enemy, pilot, gunnery)) in
            self.world
                .query_mut::<(&mut Transform, &Enemy, &mut Pilot, &mut Gunnery)>()
        {
            let scene = SceneQuery {
                statics: self.statics.as_ref(),
                ships: &ships,
                skip: Some(entity),
            };
            let view = PilotView {
                player: &self.player,
                pool: &self.waypoints,
                sensor: &self.sensor,
                query: &scene,
                madness_chance: self.config.madness_chance,
                dt,
            };
            let thought = pilot.think(transform, enemy.speed, &view, &mut self.rng);
            gunnery.eligible = thought.can_shoot;
            if thought.went_mad {
                log::info!("Enemy {:?} has gone mad", entity);
                self.events.push(SimEvent::WentMad { entity });
            }
        }
    }

    fn run_timers(&mut self) {
        let now = self.time.elapsed();
        while let Some(event) = self.timers.pop_due(now) {
            match event {
                TimerEvent::CleanupSweep => {
                    if self.state.status() == GameStatus::Started {
                        self.state.cleanup_enemies(&self.world);
                    }
                    self.schedule_cleanup(now);
                }
                TimerEvent::ShootDecide(entity) => self.decide_fire(entity, now),
                TimerEvent::ShootArm(entity) => self.arm_burst(entity, now),
                TimerEvent::ShootCooldown(entity) => {
                    let stopped = self.world.get::<&mut Gunnery>(entity).map(|mut g| g.firing = false);
                    if stopped.is_ok() {
                        self.decide_fire(entity, now);
                    }
                }
                TimerEvent::FireShot(entity) => self.fire_shot(entity, now),
                TimerEvent::ShieldRecharge(entity) => {
                    if let Some(next) = self.recharge_shield(entity) {
                        self.timers.schedule_at(now + next, TimerEvent::ShieldRecharge(entity));
                    }
                }
            }
        }
    }

    fn schedule_cleanup(&mut self, now: Duration) {
        let interval = Duration::from_secs_f32(self.config.spawner.cleanup_interval);
        self.timers.schedule_at(now + interval, TimerEvent::CleanupSweep);
    }

    fn decide_fire(&mut self, entity: Entity, now: Duration) {
        let Ok(gunnery) = self.world.get::<&Gunnery>(entity) else {
            return;
        };
        let next = match gunnery.decide(&mut self.rng) {
            FireDecision::Arm(delay) => (delay, TimerEvent::ShootArm(entity)),
            FireDecision::Hold(delay) => (delay, TimerEvent::ShootCooldown(entity)),
        };
        drop(gunnery);
        self.timers.schedule_at(now + next.0, next.1);
    }

    fn arm_burst(&mut self, entity: Entity, now: Duration) {
        let Ok(mut gunnery) = self.world.get::<&mut Gunnery>(entity) else {
            return;
        };
        let first_shot = gunnery.start_burst(&mut self.rng);
        drop(gunnery);
        if let Some(delay) = first_shot {
            self.timers.schedule_at(now + delay, TimerEvent::FireShot(entity));
        }
        self.decide_fire(entity, now);
    }

    fn fire_shot(&mut self, entity: Entity, now: Duration) {
        let Ok((transform, gunnery)) = self.world.query_one_mut::<(&Transform, &mut Gunnery)>(entity) else {
            return;
        };
        let origin = transform.position;
        let distance = origin.distance(self.player.position());
        let target = self.player.part_world_center(gunnery.target_part);
        let aim = predict_intercept(
            target,
            self.player.velocity_estimate(),
            distance,
            self.config.gunnery.prediction_divisor,
        );
        let next = gunnery.shot_fired(&mut self.rng);

        self.events.push(SimEvent::ShotFired { entity, origin, aim });
        if let Some(delay) = next {
            self.timers.schedule_at(now + delay, TimerEvent::FireShot(entity));
        }
    }

    fn sync_pool(&mut self) {
        let pool = self.spawner.pool_mut();
        for (_, (transform, handle)) in self.world.query::<(&Transform, &PoolHandle)>().iter() {
            pool.update_transform(*handle, transform.position, transform.rotation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{quiet_config, simulation};
    use physics::CollisionWorld;

    const STEP: Duration = Duration::from_micros(16_667);

    #[test]
    fn nothing_spawns_before_start() {
        let mut sim = Simulation::new(
            quiet_config(),
            PlayerShip::mothership(Transform::default()),
            Box::new(CollisionWorld::new()),
        )
        .expect("valid config");
        for _ in 0..10 {
            sim.tick(STEP);
        }
        assert_eq!(sim.spawner().active_count(), 0);
        assert!(sim.waypoints().is_empty());
    }

    #[test]
    fn start_builds_waypoints_and_fills_population() {
        let mut config = quiet_config();
        config.spawner.max_enemies = 5;
        let mut sim = simulation(config);
        assert_eq!(sim.waypoints().len(), 5 * 8);

        for _ in 0..10 {
            sim.tick(STEP);
        }
        assert_eq!(sim.spawner().active_count(), 5);
        assert_eq!(sim.state().enemies().len(), 5);
        let spawned = sim
            .drain_events()
            .iter()
            .filter(|e| matches!(e, SimEvent::EnemySpawned { .. }))
            .count();
        assert_eq!(spawned, 5);
    }

    #[test]
    fn registered_outpost_guards_arrive_after_cap() {
        let mut config = quiet_config();
        config.spawner.max_enemies = 2;
        let mut sim = simulation(config);
        let id = sim.register_outpost(Vec3::new(0.0, 0.0, -3000.0), 3);
        let stash = sim.state().outpost(id).map(|o| o.resources).unwrap_or(0);
        assert!((100..500).contains(&stash));

        for _ in 0..3 {
            sim.tick(STEP);
        }
        assert_eq!(sim.spawner().active_count(), 5);
        assert_eq!(sim.collect_outpost(id), Some(stash));
        assert_eq!(sim.collect_outpost(id), None);
    }

    #[test]
    fn stragglers_are_despawned_without_reward() {
        let mut config = quiet_config();
        config.spawner.max_enemies = 1;
        let mut sim = simulation(config);
        sim.tick(STEP);
        let e = sim.spawner().active()[0];
        sim.drain_events();

        sim.player_mut().transform.position = Vec3::new(0.0, 0.0, 20_000.0);
        sim.tick(STEP);
        let events = sim.drain_events();
        assert!(events.contains(&SimEvent::EnemyDespawned { entity: e }));
        assert!(!sim.world().contains(e));
        assert_eq!(sim.state().ship_resources(), 0);
    }

    #[test]
    fn cleanup_sweep_purges_stale_tracking() {
        let mut sim = simulation(quiet_config());
        let ghost = sim.world.spawn(());
        sim.state.add_enemy(ghost);
        let _ = sim.world.despawn(ghost);

        for _ in 0..70 {
            sim.tick(STEP);
        }
        assert!(!sim.state().enemies().contains(&ghost));
    }

    #[test]
    fn lined_up_enemy_opens_fire_with_lead() {
        let mut sim = simulation(quiet_config());
        let e = crate::test_support::spawn_enemy_of(&mut sim, 100.0, 0.0, Vec3::new(0.0, 0.0, -300.0));
        if let Ok(mut t) = sim.world.get::<&mut Transform>(e) {
            t.look_at(Vec3::ZERO, Vec3::Y);
        }
        // Keep the ship from turning away between shots.
        if let Ok(mut enemy) = sim.world.get::<&mut Enemy>(e) {
            enemy.speed = 0.001;
        }

        let mut shots = Vec::new();
        for _ in 0..(60 * 3) {
            sim.player_mut().transform.position.x += 1.0;
            sim.tick(STEP);
            let player_x = sim.player().position().x;
            shots.extend(sim.drain_events().into_iter().filter_map(|ev| match ev {
                SimEvent::ShotFired { entity, aim, .. } if entity == e => Some((aim, player_x)),
                _ => None,
            }));
        }
        assert!(!shots.is_empty());
        // The player drifts +x by one unit per tick, so every shot leads on +x
        // by more than the widest part offset.
        for (aim, player_x) in shots {
            assert!(aim.x > player_x, "aim {aim:?} vs player x {player_x}");
        }
    }

    #[test]
    fn sustained_fire_respects_the_fire_rate() {
        let mut sim = simulation(quiet_config());
        let e = crate::test_support::spawn_enemy_of(&mut sim, 100.0, 0.0, Vec3::new(0.0, 0.0, -300.0));
        // No pilot: the ship stays lined up for the whole run.
        let _ = sim.world.remove_one::<Pilot>(e);
        if let Ok(mut gunnery) = sim.world.get::<&mut Gunnery>(e) {
            gunnery.eligible = true;
        }

        let mut shot_times = Vec::new();
        for _ in 0..(60 * 120) {
            sim.tick(STEP);
            let now = sim.time().elapsed().as_secs_f32();
            for event in sim.drain_events() {
                if matches!(event, SimEvent::ShotFired { entity, .. } if entity == e) {
                    shot_times.push(now);
                }
            }
        }

        let interval = 1.0 / sim.config().gunnery.shots_per_sec;
        assert!(shot_times.len() > 10);
        assert!(shot_times.len() as f32 <= 120.0 / interval + 1.0, "{} shots", shot_times.len());
        for pair in shot_times.windows(2) {
            let gap = pair[1] - pair[0];
            // Shots land on tick boundaries.
            assert!(gap >= interval - STEP.as_secs_f32(), "gap {gap}");
        }
    }

    #[test]
    fn shields_recharge_over_time() {
        let mut sim = simulation(quiet_config());
        let e = crate::test_support::spawn_enemy_of(&mut sim, 100.0, 50.0, Vec3::new(0.0, 0.0, -900.0));
        sim.apply_damage(e, 30.0, DamageSource::Environment);

        // Shield delay is 3 s; give it 5 s.
        for _ in 0..(60 * 5) {
            sim.tick(STEP);
        }
        let shield = sim.world().get::<&Hull>(e).map(|h| h.shield).unwrap_or(0.0);
        assert!(shield > 20.0, "{shield}");
    }
}
