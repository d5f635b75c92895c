//! Sky Base headless simulation server.
//!
//! Usage: `skybase [config.ron] [seconds]`
//!
//! Runs the enemy simulation in real time at the configured tick rate with a
//! scripted mothership and a stand-in for the crew's turrets, logging what
//! happens. The network layer would relay the same events to clients.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use engine_core::{Transform, Vec3};
use game::enemy::Enemy;
use game::{DamageOutcome, DamageSource, PlayerId, PlayerShip, SimConfig, SimEvent, Simulation};
use physics::{ColliderTag, CollisionWorld};
use rand::prelude::*;

/// Mothership cruise speed, units per second.
const CRUISE_SPEED: f32 = 20.0;
/// Seconds between turret volleys.
const TURRET_PERIOD: f32 = 0.5;
const TURRET_RANGE: f32 = 400.0;
const TURRET_DAMAGE: f32 = 25.0;
/// Enemies closer than this have hit the hull.
const RAM_DISTANCE: f32 = 20.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config_path = PathBuf::from(args.next().unwrap_or_else(|| "skybase.ron".to_string()));
    let seconds: f64 = match args.next() {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("invalid duration {raw:?}, expected seconds"))?,
        None => 60.0,
    };

    let config = SimConfig::load(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let mut scene_rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed ^ 0x5eed),
        None => StdRng::from_entropy(),
    };
    let (statics, outposts) = build_scene(&mut scene_rng);

    let player = PlayerShip::mothership(Transform::default());
    let mut sim = Simulation::new(config, player, Box::new(statics)).context("invalid simulation config")?;
    for location in outposts {
        sim.register_outpost(location, 3);
    }

    log::info!("Starting Sky Base simulation for {seconds:.0}s");
    sim.start();

    let end = Duration::from_secs_f64(seconds);
    let mut stats = RunStats::default();
    let mut turret_timer = 0.0_f32;
    let mut last = Instant::now();

    while sim.time().elapsed() < end {
        let now = Instant::now();
        sim.time_mut().accumulate(now - last);
        last = now;

        while sim.time_mut().should_fixed_update() {
            let step = sim.time().fixed_timestep();
            let dt = step.as_secs_f32();

            let ship = &mut sim.player_mut().transform;
            let heading = ship.forward();
            ship.translate(heading * CRUISE_SPEED * dt);

            sim.tick(step);

            turret_timer += dt;
            if turret_timer >= TURRET_PERIOD {
                turret_timer -= TURRET_PERIOD;
                fire_turret(&mut sim);
            }
            check_rams(&mut sim, &mut stats);

            for event in sim.drain_events() {
                stats.record(&event);
            }
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    sim.finish();
    log::info!(
        "Done after {} ticks: {} spawned, {} destroyed, {} despawned, {} shots fired, {} gone mad",
        sim.time().frame_count(),
        stats.spawned,
        stats.destroyed,
        stats.despawned,
        stats.shots,
        stats.mad
    );
    log::info!(
        "Score {} ({} kills), ship resources {}, hull damage taken {:.0}",
        sim.state().player_score(PlayerId(0)),
        sim.state().player_kills(PlayerId(0)),
        sim.state().ship_resources(),
        stats.hull_damage
    );
    Ok(())
}

#[derive(Debug, Default)]
struct RunStats {
    spawned: u32,
    destroyed: u32,
    despawned: u32,
    shots: u32,
    mad: u32,
    hull_damage: f32,
}

impl RunStats {
    fn record(&mut self, event: &SimEvent) {
        match event {
            SimEvent::EnemySpawned { .. } => self.spawned += 1,
            SimEvent::EnemyDestroyed { .. } => self.destroyed += 1,
            SimEvent::EnemyDespawned { .. } => self.despawned += 1,
            SimEvent::ShotFired { .. } => self.shots += 1,
            SimEvent::WentMad { .. } => self.mad += 1,
        }
    }
}

/// Asteroids scattered around the flight path, plus two outposts ahead.
fn build_scene<R: Rng>(rng: &mut R) -> (CollisionWorld, Vec<Vec3>) {
    let mut world = CollisionWorld::new();
    for _ in 0..200 {
        let center = Vec3::new(
            rng.gen_range(-3000.0..3000.0),
            rng.gen_range(-600.0..600.0),
            rng.gen_range(-6000.0..1000.0),
        );
        // Keep the mothership's lane clear.
        if center.x.abs() < 200.0 && center.y.abs() < 200.0 {
            continue;
        }
        world.add_sphere(center, rng.gen_range(10.0..60.0), ColliderTag::Debris);
    }

    let outposts = vec![Vec3::new(-800.0, 0.0, -2500.0), Vec3::new(900.0, 100.0, -4500.0)];
    for location in &outposts {
        world.add_cuboid(*location, Vec3::splat(40.0), ColliderTag::Outpost);
    }
    world.update_query_pipeline();
    log::info!("Scene built with {} colliders", world.len());
    (world, outposts)
}

/// The crew's turrets hit the closest enemy in range.
fn fire_turret(sim: &mut Simulation) {
    let origin = sim.player().position();
    let target = sim
        .world()
        .query::<(&Transform, &Enemy)>()
        .iter()
        .map(|(entity, (t, _))| (entity, t.position.distance(origin)))
        .filter(|(_, d)| *d < TURRET_RANGE)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(entity, _)| entity);

    if let Some(entity) = target {
        if let DamageOutcome::Destroyed { resources } =
            sim.apply_damage(entity, TURRET_DAMAGE, DamageSource::Player(PlayerId(0)))
        {
            log::info!("Turret destroyed {:?} (+{} resources)", entity, resources);
        }
    }
}

/// Enemies that reached the hull crash into it.
fn check_rams(sim: &mut Simulation, stats: &mut RunStats) {
    let origin = sim.player().position();
    let rammers: Vec<_> = sim
        .world()
        .query::<(&Transform, &Enemy)>()
        .iter()
        .filter(|(_, (t, _))| t.position.distance(origin) < RAM_DISTANCE)
        .map(|(entity, _)| entity)
        .collect();

    for entity in rammers {
        if let Some(damage) = sim.ram_player(entity) {
            log::warn!("Enemy {:?} rammed the mothership for {:.0}", entity, damage);
            stats.hull_damage += damage;
        }
    }
}
