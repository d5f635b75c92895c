//! Enemy ship types and components.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound (exclusive) of the random bonus added to an enemy's resource drop.
pub const DROP_RESOURCE_RANGE: u32 = 100;

/// Kinds of enemy ship. Each needs an entry in the type table before anything spawns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyType {
    /// Baseline fighter, no shields.
    Fighter,
    /// Slow, armoured, shielded.
    Tank,
    /// Fast and fragile.
    Assassin,
}

impl EnemyType {
    pub const ALL: [EnemyType; 3] = [EnemyType::Fighter, EnemyType::Tank, EnemyType::Assassin];

    pub fn from_index(index: usize) -> Result<Self, ConfigError> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(ConfigError::InvalidEnemyIndex(index))
    }
}

/// Immutable stat bundle for one enemy type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyProperties {
    pub kind: EnemyType,
    pub max_health: f32,
    /// Max recharging shield level. 0 disables shields.
    pub max_shield: f32,
    pub collision_damage: f32,
    pub speed: f32,
}

impl EnemyProperties {
    pub fn new(kind: EnemyType, max_health: f32, max_shield: f32, collision_damage: f32, speed: f32) -> Self {
        Self {
            kind,
            max_health,
            max_shield,
            collision_damage,
            speed,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, value| ConfigError::InvalidEnemyStat {
            kind: self.kind,
            field,
            value,
        };
        if !(self.max_health > 0.0) {
            return Err(invalid("max_health", self.max_health));
        }
        if !(self.max_shield >= 0.0) {
            return Err(invalid("max_shield", self.max_shield));
        }
        if !(self.collision_damage >= 0.0) {
            return Err(invalid("collision_damage", self.collision_damage));
        }
        if !(self.speed > 0.0) {
            return Err(invalid("speed", self.speed));
        }
        Ok(())
    }
}

/// Lookup table from type to stats, built once at startup.
#[derive(Debug, Clone)]
pub struct EnemyTypeTable {
    entries: Vec<EnemyProperties>,
}

impl EnemyTypeTable {
    /// Build the table. Every type must be defined exactly once with sane stats.
    pub fn from_properties(properties: &[EnemyProperties]) -> Result<Self, ConfigError> {
        let mut entries: Vec<EnemyProperties> = Vec::with_capacity(EnemyType::ALL.len());
        for props in properties {
            if entries.iter().any(|e| e.kind == props.kind) {
                return Err(ConfigError::DuplicateEnemyType(props.kind));
            }
            props.validate()?;
            entries.push(*props);
        }
        if let Some(missing) = EnemyType::ALL
            .iter()
            .find(|kind| !entries.iter().any(|e| e.kind == **kind))
        {
            return Err(ConfigError::MissingEnemyType(*missing));
        }
        Ok(Self { entries })
    }

    pub fn get(&self, kind: EnemyType) -> Option<&EnemyProperties> {
        self.entries.iter().find(|e| e.kind == kind)
    }

    /// Uniformly random type.
    pub fn random_type<R: Rng>(&self, rng: &mut R) -> EnemyType {
        EnemyType::ALL[rng.gen_range(0..EnemyType::ALL.len())]
    }
}

/// Enemy ship component.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub kind: EnemyType,
    pub speed: f32,
    /// Damage dealt to whatever this ship rams.
    pub collision_damage: f32,
    dropped_resources: u32,
}

impl Enemy {
    /// Roll the resource drop once, at spawn: max health + max shield + a bonus below
    /// [`DROP_RESOURCE_RANGE`].
    pub fn new<R: Rng>(props: &EnemyProperties, rng: &mut R) -> Self {
        let bonus = rng.gen_range(0..DROP_RESOURCE_RANGE);
        Self {
            kind: props.kind,
            speed: props.speed,
            collision_damage: props.collision_damage,
            dropped_resources: (props.max_health + props.max_shield).round() as u32 + bonus,
        }
    }

    pub fn dropped_resources(&self) -> u32 {
        self.dropped_resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn default_table_covers_every_type() {
        let table = EnemyTypeTable::from_properties(&SimConfig::default().enemy_types).expect("valid");
        for kind in EnemyType::ALL {
            assert_eq!(table.get(kind).map(|p| p.kind), Some(kind));
        }
        let tank = table.get(EnemyType::Tank).expect("tank");
        assert_eq!((tank.max_health, tank.max_shield, tank.speed), (200.0, 50.0, 10.0));
    }

    #[test]
    fn missing_type_is_fatal() {
        let props = [
            EnemyProperties::new(EnemyType::Fighter, 100.0, 0.0, 15.0, 15.0),
            EnemyProperties::new(EnemyType::Tank, 200.0, 50.0, 50.0, 10.0),
        ];
        assert!(matches!(
            EnemyTypeTable::from_properties(&props),
            Err(ConfigError::MissingEnemyType(EnemyType::Assassin))
        ));
    }

    #[test]
    fn duplicate_type_is_fatal() {
        let mut props = SimConfig::default().enemy_types;
        props.push(EnemyProperties::new(EnemyType::Fighter, 1.0, 0.0, 0.0, 1.0));
        assert!(matches!(
            EnemyTypeTable::from_properties(&props),
            Err(ConfigError::DuplicateEnemyType(EnemyType::Fighter))
        ));
    }

    #[test]
    fn non_positive_health_is_fatal() {
        let mut props = SimConfig::default().enemy_types;
        props[2].max_health = 0.0;
        assert!(matches!(
            EnemyTypeTable::from_properties(&props),
            Err(ConfigError::InvalidEnemyStat {
                kind: EnemyType::Assassin,
                field: "max_health",
                ..
            })
        ));
    }

    #[test]
    fn index_lookup_rejects_out_of_range() {
        assert_eq!(EnemyType::from_index(1).ok(), Some(EnemyType::Tank));
        assert!(matches!(EnemyType::from_index(3), Err(ConfigError::InvalidEnemyIndex(3))));
    }

    #[test]
    fn drop_is_stats_plus_bounded_bonus() {
        let props = EnemyProperties::new(EnemyType::Tank, 200.0, 50.0, 50.0, 10.0);
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let enemy = Enemy::new(&props, &mut rng);
            assert!(enemy.dropped_resources() >= 250);
            assert!(enemy.dropped_resources() < 250 + DROP_RESOURCE_RANGE);
        }
    }
}
