//! Damage resolution, kills and shield recharge.

use std::time::Duration;

use engine_core::{Entity, Hull, Lifetime, Quat, Transform, Vec3};

use crate::enemy::Enemy;
use crate::pool::PoolHandle;
use crate::sim::{SimEvent, Simulation};
use crate::state::PlayerId;

/// Score for destroying an enemy.
pub const KILL_SCORE: u32 = 10;
/// Seconds an explosion stays visible.
pub const EXPLOSION_LIFETIME: f32 = 2.0;
/// Interval between shield recharge steps.
pub const SHIELD_TICK: Duration = Duration::from_millis(100);

/// Who dealt the damage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageSource {
    Player(PlayerId),
    /// The mothership, debris and anything else nobody gets credit for.
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DamageOutcome {
    /// Target is not a live enemy.
    Ignored,
    /// Hit landed; the ship survived.
    Absorbed { shield: f32, health: f32 },
    /// Hit was fatal.
    Destroyed { resources: u32 },
}

/// Shield recharge bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct ShieldRegen {
    last_check: f32,
}

impl ShieldRegen {
    pub fn new(hull: &Hull) -> Self {
        Self {
            last_check: hull.shield,
        }
    }

    /// One recharge check. An untouched shield grows by a tenth of the
    /// per-second rate; a shield hit since the last check waits `delay`.
    /// Returns the time until the next check.
    pub fn step(&mut self, hull: &mut Hull, recharge_rate: f32, delay: Duration) -> Duration {
        let untouched = hull.shield == self.last_check;
        if untouched {
            hull.recharge_shield(recharge_rate / 10.0);
        }
        self.last_check = hull.shield;
        if untouched {
            SHIELD_TICK
        } else {
            delay
        }
    }
}

/// A pooled explosion effect, released when its [`Lifetime`] runs out.
#[derive(Debug, Clone, Copy)]
pub struct Explosion {
    pub handle: PoolHandle,
}

impl Simulation {
    /// Apply `amount` damage to an enemy: shield first, the rest to health.
    /// A fatal hit destroys the ship and pays out exactly once.
    pub fn apply_damage(&mut self, entity: Entity, amount: f32, source: DamageSource) -> DamageOutcome {
        let (absorbed, destroyed) = {
            let Ok(mut hull) = self.world.get::<&mut Hull>(entity) else {
                return DamageOutcome::Ignored;
            };
            if hull.is_destroyed() {
                return DamageOutcome::Ignored;
            }
            let absorbed = hull.take_damage(amount);
            (absorbed, hull.is_destroyed())
        };

        if !destroyed {
            return DamageOutcome::Absorbed {
                shield: absorbed.by_shield,
                health: absorbed.by_health,
            };
        }
        match self.destroy_enemy(entity, source) {
            Some(resources) => DamageOutcome::Destroyed { resources },
            None => DamageOutcome::Ignored,
        }
    }

    /// An enemy crashed into the mothership. The ship is lost without credit;
    /// returns the damage it deals to the mothership.
    pub fn ram_player(&mut self, entity: Entity) -> Option<f32> {
        let damage = self.world.get::<&Enemy>(entity).ok()?.collision_damage;
        self.destroy_enemy(entity, DamageSource::Environment)?;
        Some(damage)
    }

    /// Pay out and remove a dead enemy. Returns the resources it dropped.
    pub(crate) fn destroy_enemy(&mut self, entity: Entity, source: DamageSource) -> Option<u32> {
        let (position, resources) = {
            let (transform, enemy) = self.world.query_one_mut::<(&Transform, &Enemy)>(entity).ok()?;
            (transform.position, enemy.dropped_resources())
        };

        if let DamageSource::Player(player) = source {
            self.state.add_player_score(player, KILL_SCORE);
            self.state.add_kill(player);
        }
        self.state.add_ship_resources(resources);
        self.spawn_explosion(position);
        self.retire_enemy(entity);

        log::debug!("Enemy {:?} destroyed by {:?}, dropped {}", entity, source, resources);
        self.events.push(SimEvent::EnemyDestroyed {
            entity,
            source,
            resources,
        });
        Some(resources)
    }

    /// Take an enemy out of play: timers, game-state tracking, pool and world.
    pub(crate) fn retire_enemy(&mut self, entity: Entity) -> bool {
        self.timers.cancel_owner(entity);
        self.state.remove_enemy(entity);
        self.spawner.retire(&mut self.world, entity)
    }

    fn spawn_explosion(&mut self, position: Vec3) {
        let handle = self.explosions.acquire();
        self.explosions.enable_at(handle, position, Quat::IDENTITY, Vec3::ONE);
        self.world.spawn((
            Transform::from_position(position),
            Explosion { handle },
            Lifetime::new(EXPLOSION_LIFETIME),
        ));
    }

    /// Shield recharge timer body.
    pub(crate) fn recharge_shield(&mut self, entity: Entity) -> Option<Duration> {
        let delay = Duration::from_secs_f32(self.config.shields.delay);
        let rate = self.config.shields.recharge_rate;
        let (hull, regen) = self.world.query_one_mut::<(&mut Hull, &mut ShieldRegen)>(entity).ok()?;
        Some(regen.step(hull, rate, delay))
    }

    /// Age explosions and hand expired ones back to the pool.
    pub(crate) fn update_effects(&mut self, dt: f32) {
        let mut expired = Vec::new();
        for (entity, (lifetime, explosion)) in self.world.query_mut::<(&mut Lifetime, &Explosion)>() {
            if lifetime.update(dt) {
                expired.push((entity, explosion.handle));
            }
        }
        for (entity, handle) in expired {
            self.explosions.release(handle);
            let _ = self.world.despawn(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::enemy::EnemyType;
    use crate::state::GameStatus;
    use crate::test_support::{simulation, spawn_enemy_of};

    #[test]
    fn shield_soaks_first_then_health() {
        let mut sim = simulation(SimConfig::default());
        // 100 health, 50 shield.
        let e = spawn_enemy_of(&mut sim, 100.0, 50.0, Vec3::new(0.0, 0.0, -900.0));

        assert_eq!(
            sim.apply_damage(e, 30.0, DamageSource::Environment),
            DamageOutcome::Absorbed {
                shield: 30.0,
                health: 0.0
            }
        );
        let hull = *sim.world().get::<&Hull>(e).expect("hull");
        assert_eq!((hull.shield, hull.health), (20.0, 100.0));

        assert_eq!(
            sim.apply_damage(e, 40.0, DamageSource::Environment),
            DamageOutcome::Absorbed {
                shield: 20.0,
                health: 20.0
            }
        );
        let hull = *sim.world().get::<&Hull>(e).expect("hull");
        assert_eq!((hull.shield, hull.health), (0.0, 80.0));
    }

    #[test]
    fn fatal_hit_pays_out_once() {
        let mut sim = simulation(SimConfig::default());
        let player = PlayerId(3);
        let e = spawn_enemy_of(&mut sim, 100.0, 50.0, Vec3::new(0.0, 0.0, -900.0));
        let drop = sim.world().get::<&Enemy>(e).expect("enemy").dropped_resources();
        let before = sim.spawner().active_count();

        assert_eq!(
            sim.apply_damage(e, 200.0, DamageSource::Player(player)),
            DamageOutcome::Destroyed { resources: drop }
        );
        assert_eq!(sim.state().player_score(player), KILL_SCORE);
        assert_eq!(sim.state().player_kills(player), 1);
        assert_eq!(sim.state().ship_resources(), u64::from(drop));
        assert_eq!(sim.spawner().active_count(), before - 1);
        assert!(!sim.world().contains(e));
        assert!(!sim.state().enemies().contains(&e));
        assert_eq!(sim.explosions().in_use(), 1);

        // Already dead: nothing more happens.
        assert_eq!(sim.apply_damage(e, 200.0, DamageSource::Player(player)), DamageOutcome::Ignored);
        assert_eq!(sim.state().player_score(player), KILL_SCORE);
        assert_eq!(sim.state().ship_resources(), u64::from(drop));
    }

    #[test]
    fn environment_kills_give_resources_but_no_score() {
        let mut sim = simulation(SimConfig::default());
        let e = spawn_enemy_of(&mut sim, 50.0, 0.0, Vec3::new(0.0, 0.0, -900.0));
        assert!(matches!(
            sim.apply_damage(e, 60.0, DamageSource::Environment),
            DamageOutcome::Destroyed { .. }
        ));
        assert!(sim.state().ship_resources() >= 50);
        assert_eq!(sim.state().player_score(PlayerId(0)), 0);
    }

    #[test]
    fn negative_damage_is_a_no_op_hit() {
        let mut sim = simulation(SimConfig::default());
        let e = spawn_enemy_of(&mut sim, 100.0, 50.0, Vec3::new(0.0, 0.0, -900.0));
        assert_eq!(
            sim.apply_damage(e, -25.0, DamageSource::Environment),
            DamageOutcome::Absorbed {
                shield: 0.0,
                health: 0.0
            }
        );
        let hull = *sim.world().get::<&Hull>(e).expect("hull");
        assert_eq!((hull.shield, hull.health), (50.0, 100.0));
    }

    #[test]
    fn ramming_deals_collision_damage() {
        let mut sim = simulation(SimConfig::default());
        let e = spawn_enemy_of(&mut sim, 100.0, 0.0, Vec3::new(0.0, 0.0, -900.0));
        let expected = sim.world().get::<&Enemy>(e).expect("enemy").collision_damage;
        assert_eq!(sim.ram_player(e), Some(expected));
        assert_eq!(sim.ram_player(e), None);
        assert!(sim.state().status() == GameStatus::Started);
    }

    #[test]
    fn explosions_expire_back_into_the_pool() {
        let mut sim = simulation(SimConfig::default());
        let e = spawn_enemy_of(&mut sim, 10.0, 0.0, Vec3::new(0.0, 0.0, -900.0));
        sim.apply_damage(e, 10.0, DamageSource::Environment);
        assert_eq!(sim.explosions().in_use(), 1);

        sim.update_effects(EXPLOSION_LIFETIME / 2.0);
        assert_eq!(sim.explosions().in_use(), 1);
        sim.update_effects(EXPLOSION_LIFETIME);
        assert_eq!(sim.explosions().in_use(), 0);
    }

    #[test]
    fn shield_recharges_only_when_untouched() {
        let mut hull = Hull::new(200.0, 50.0);
        hull.shield = 20.0;
        let mut regen = ShieldRegen::new(&hull);
        let delay = Duration::from_secs(3);

        assert_eq!(regen.step(&mut hull, 10.0, delay), SHIELD_TICK);
        assert_eq!(hull.shield, 21.0);

        hull.take_damage(5.0);
        assert_eq!(regen.step(&mut hull, 10.0, delay), delay);
        assert_eq!(hull.shield, 16.0);

        assert_eq!(regen.step(&mut hull, 10.0, delay), SHIELD_TICK);
        assert_eq!(hull.shield, 17.0);

        hull.shield = 50.0;
        let mut full = ShieldRegen::new(&hull);
        full.step(&mut hull, 10.0, delay);
        assert_eq!(hull.shield, 50.0);
    }

    #[test]
    fn destroying_cancels_pending_timers() {
        let mut sim = simulation(SimConfig::default());
        let e = spawn_enemy_of(&mut sim, 100.0, 50.0, Vec3::new(0.0, 0.0, -900.0));
        assert!(sim.timers.iter().any(|t| t.owner() == Some(e)));
        sim.apply_damage(e, 1000.0, DamageSource::Environment);
        assert!(sim.timers.iter().all(|t| t.owner() != Some(e)));
    }
}
