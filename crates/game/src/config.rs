//! Simulation configuration. Loaded from a RON file at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::enemy::{EnemyProperties, EnemyType};
use crate::error::ConfigError;

/// Every tunable of the enemy simulation. All fields fall back to the values
/// the game shipped with, so a config file only needs the overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// RNG seed. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Fixed simulation rate in Hz.
    #[serde(default = "default_tick_rate")]
    pub tick_rate: f64,
    /// Per-tick probability that an enemy turns suicidal.
    /// Tuned for 60 Hz: about 1% over a ten minute game.
    #[serde(default = "default_madness_chance")]
    pub madness_chance: f64,
    #[serde(default)]
    pub spawner: SpawnerConfig,
    #[serde(default)]
    pub waypoints: WaypointConfig,
    #[serde(default)]
    pub gunnery: GunneryConfig,
    #[serde(default)]
    pub shields: ShieldConfig,
    /// Stat bundle per enemy type.
    #[serde(default = "default_enemy_types")]
    pub enemy_types: Vec<EnemyProperties>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnerConfig {
    /// Regular enemies alive at once.
    #[serde(default = "default_max_enemies")]
    pub max_enemies: usize,
    #[serde(default = "default_min_spawn_distance")]
    pub min_spawn_distance: f32,
    #[serde(default = "default_max_spawn_distance")]
    pub max_spawn_distance: f32,
    /// Radius of the sphere around an outpost in which its guards appear.
    #[serde(default = "default_outpost_spawn_radius")]
    pub outpost_spawn_radius: f32,
    /// Enemies farther than this from the player are despawned.
    #[serde(default = "default_despawn_distance")]
    pub despawn_distance: f32,
    #[serde(default = "default_waypoints_per_enemy")]
    pub waypoints_per_enemy: usize,
    /// Seconds between enemy-list reconciliation sweeps.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaypointConfig {
    /// Waypoints generated per allowed enemy.
    #[serde(default = "default_per_enemy_factor")]
    pub per_enemy_factor: usize,
    #[serde(default = "default_waypoint_radius")]
    pub radius: f32,
    /// Stretch along the player's right axis.
    #[serde(default = "default_width_scale")]
    pub width_scale: f32,
    /// Squash along the player's up axis.
    #[serde(default = "default_height_scale")]
    pub height_scale: f32,
    /// Offset in the player frame: a little up and ahead keeps enemies in view.
    #[serde(default = "default_waypoint_shift")]
    pub shift: [f32; 3],
    /// Rejection-sampling attempts per waypoint before falling back.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GunneryConfig {
    #[serde(default = "default_shots_per_sec")]
    pub shots_per_sec: f32,
    /// Seconds per shoot / hold cycle.
    #[serde(default = "default_shoot_period")]
    pub shoot_period: f32,
    /// Percentage jitter (+/-) on the cycle length.
    #[serde(default = "default_percentage_variation")]
    pub percentage_variation: u32,
    /// Lead factor divisor: the shot leads by `distance / divisor` ticks of player motion.
    #[serde(default = "default_prediction_divisor")]
    pub prediction_divisor: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldConfig {
    /// Seconds without damage before the shield starts recharging.
    #[serde(default = "default_shield_delay")]
    pub delay: f32,
    /// Shield units per second.
    #[serde(default = "default_recharge_rate")]
    pub recharge_rate: f32,
}

fn default_tick_rate() -> f64 {
    60.0
}
fn default_madness_chance() -> f64 {
    1.0 - 0.999_999_720_824_043
}
fn default_max_enemies() -> usize {
    20
}
fn default_min_spawn_distance() -> f32 {
    800.0
}
fn default_max_spawn_distance() -> f32 {
    1200.0
}
fn default_outpost_spawn_radius() -> f32 {
    150.0
}
fn default_despawn_distance() -> f32 {
    6000.0
}
fn default_waypoints_per_enemy() -> usize {
    10
}
fn default_cleanup_interval() -> f32 {
    1.0
}
fn default_per_enemy_factor() -> usize {
    8
}
fn default_waypoint_radius() -> f32 {
    100.0
}
fn default_width_scale() -> f32 {
    1.5
}
fn default_height_scale() -> f32 {
    0.5
}
fn default_waypoint_shift() -> [f32; 3] {
    [0.0, 15.0, -30.0]
}
fn default_max_attempts() -> usize {
    64
}
fn default_shots_per_sec() -> f32 {
    1.0
}
fn default_shoot_period() -> f32 {
    2.0
}
fn default_percentage_variation() -> u32 {
    20
}
fn default_prediction_divisor() -> f32 {
    10.0
}
fn default_shield_delay() -> f32 {
    3.0
}
fn default_recharge_rate() -> f32 {
    10.0
}

/// Fighter is the baseline ship; Tank trades speed for shields; Assassin is fast and fragile.
fn default_enemy_types() -> Vec<EnemyProperties> {
    vec![
        EnemyProperties::new(EnemyType::Fighter, 100.0, 0.0, 15.0, 15.0),
        EnemyProperties::new(EnemyType::Tank, 200.0, 50.0, 50.0, 10.0),
        EnemyProperties::new(EnemyType::Assassin, 50.0, 20.0, 5.0, 30.0),
    ]
}

impl Default for SpawnerConfig {
    fn default() -> Self {
        Self {
            max_enemies: default_max_enemies(),
            min_spawn_distance: default_min_spawn_distance(),
            max_spawn_distance: default_max_spawn_distance(),
            outpost_spawn_radius: default_outpost_spawn_radius(),
            despawn_distance: default_despawn_distance(),
            waypoints_per_enemy: default_waypoints_per_enemy(),
            cleanup_interval: default_cleanup_interval(),
        }
    }
}

impl Default for WaypointConfig {
    fn default() -> Self {
        Self {
            per_enemy_factor: default_per_enemy_factor(),
            radius: default_waypoint_radius(),
            width_scale: default_width_scale(),
            height_scale: default_height_scale(),
            shift: default_waypoint_shift(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for GunneryConfig {
    fn default() -> Self {
        Self {
            shots_per_sec: default_shots_per_sec(),
            shoot_period: default_shoot_period(),
            percentage_variation: default_percentage_variation(),
            prediction_divisor: default_prediction_divisor(),
        }
    }
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            delay: default_shield_delay(),
            recharge_rate: default_recharge_rate(),
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            tick_rate: default_tick_rate(),
            madness_chance: default_madness_chance(),
            spawner: SpawnerConfig::default(),
            waypoints: WaypointConfig::default(),
            gunnery: GunneryConfig::default(),
            shields: ShieldConfig::default(),
            enemy_types: default_enemy_types(),
        }
    }
}

impl SimConfig {
    /// Load config from `path`. A missing file yields the defaults; an
    /// unreadable, malformed or out-of-range file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = ron::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject tunables that would stall or corrupt the simulation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn check(ok: bool, field: &'static str, reason: &'static str) -> Result<(), ConfigError> {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::Invalid { field, reason })
            }
        }

        check(self.tick_rate > 0.0, "tick_rate", "must be positive")?;
        check(
            (0.0..=1.0).contains(&self.madness_chance),
            "madness_chance",
            "must be a probability",
        )?;
        check(
            self.spawner.min_spawn_distance >= 0.0
                && self.spawner.min_spawn_distance <= self.spawner.max_spawn_distance,
            "spawner.min_spawn_distance",
            "must be non-negative and not above max_spawn_distance",
        )?;
        check(
            self.spawner.despawn_distance > self.spawner.max_spawn_distance,
            "spawner.despawn_distance",
            "must exceed max_spawn_distance",
        )?;
        check(
            self.spawner.cleanup_interval > 0.0,
            "spawner.cleanup_interval",
            "must be positive",
        )?;
        check(self.waypoints.radius > 0.0, "waypoints.radius", "must be positive")?;
        check(
            self.waypoints.max_attempts > 0,
            "waypoints.max_attempts",
            "must be at least 1",
        )?;
        check(
            self.gunnery.shots_per_sec > 0.0,
            "gunnery.shots_per_sec",
            "must be positive",
        )?;
        check(
            self.gunnery.shoot_period > 0.0,
            "gunnery.shoot_period",
            "must be positive",
        )?;
        check(
            self.gunnery.percentage_variation < 100,
            "gunnery.percentage_variation",
            "must be below 100",
        )?;
        check(
            self.gunnery.prediction_divisor > 0.0,
            "gunnery.prediction_divisor",
            "must be positive",
        )?;
        check(self.shields.delay > 0.0, "shields.delay", "must be positive")?;
        check(
            self.shields.recharge_rate >= 0.0,
            "shields.recharge_rate",
            "must not be negative",
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SimConfig::default();
        config.validate().expect("defaults validate");
        assert_eq!(config.enemy_types.len(), 3);
        assert!((config.madness_chance - 2.79175957e-7).abs() < 1e-12);
    }

    #[test]
    fn partial_ron_keeps_defaults() {
        let config: SimConfig = ron::from_str(
            "(seed: Some(7), spawner: (max_enemies: 4), gunnery: (shots_per_sec: 2.5))",
        )
        .expect("parses");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.spawner.max_enemies, 4);
        assert_eq!(config.spawner.waypoints_per_enemy, 10);
        assert_eq!(config.gunnery.shots_per_sec, 2.5);
        assert_eq!(config.gunnery.percentage_variation, 20);
        assert_eq!(config.enemy_types.len(), 3);
    }

    #[test]
    fn enemy_types_parse_from_ron() {
        let config: SimConfig = ron::from_str(
            "(enemy_types: [(kind: Tank, max_health: 300.0, max_shield: 80.0, collision_damage: 60.0, speed: 8.0)])",
        )
        .expect("parses");
        assert_eq!(config.enemy_types.len(), 1);
        assert_eq!(config.enemy_types[0].kind, EnemyType::Tank);
        assert_eq!(config.enemy_types[0].max_shield, 80.0);
    }

    #[test]
    fn zero_fire_rate_is_rejected() {
        let mut config = SimConfig::default();
        config.gunnery.shots_per_sec = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "gunnery.shots_per_sec",
                ..
            })
        ));
    }

    #[test]
    fn sample_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../skybase.ron");
        let config = SimConfig::load(&path).expect("sample config is valid");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.enemy_types.len(), 3);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = SimConfig::load(Path::new("definitely/not/here.ron")).expect("defaults");
        assert_eq!(config.spawner.max_enemies, 20);
    }
}
