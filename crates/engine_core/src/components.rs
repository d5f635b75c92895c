//! Common ECS components used across the simulation.

/// Health and a recharging shield layered on top of it.
///
/// Damage drains the shield first; whatever the shield cannot absorb carries
/// over to health. Neither pool goes below zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hull {
    pub health: f32,
    pub max_health: f32,
    pub shield: f32,
    pub max_shield: f32,
}

/// How a single hit was split between the two pools.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Absorbed {
    pub by_shield: f32,
    pub by_health: f32,
}

impl Hull {
    pub fn new(max_health: f32, max_shield: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            shield: max_shield,
            max_shield,
        }
    }

    pub fn take_damage(&mut self, amount: f32) -> Absorbed {
        let amount = amount.max(0.0);
        if amount <= self.shield {
            self.shield -= amount;
            return Absorbed {
                by_shield: amount,
                by_health: 0.0,
            };
        }

        let by_shield = self.shield;
        let remainder = amount - by_shield;
        self.shield = 0.0;
        let by_health = remainder.min(self.health);
        self.health = (self.health - remainder).max(0.0);
        Absorbed {
            by_shield,
            by_health,
        }
    }

    pub fn recharge_shield(&mut self, amount: f32) {
        self.shield = (self.shield + amount).min(self.max_shield);
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0.0
    }
}

/// Lifetime component for temporary entities (explosions, effects).
#[derive(Debug, Clone, Copy)]
pub struct Lifetime {
    pub remaining: f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    pub fn update(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }
}
