//! Collider tags and collision groups.

use rapier3d::prelude::*;

/// Category of a collider, as seen by obstacle sensors and damage routing.
///
/// The discriminant doubles as the collision-group bit and is stored in the
/// collider's `user_data`.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColliderTag {
    /// Asteroids and wreckage
    Debris = 1 << 0,
    /// Enemy fighters
    EnemyShip = 1 << 1,
    /// Outpost stations
    Outpost = 1 << 2,
    /// Parts of the player's mothership
    PlayerShip = 1 << 3,
    /// Bullets
    Projectile = 1 << 4,
}

impl ColliderTag {
    /// Recover a tag from a collider's `user_data`.
    pub fn from_user_data(data: u128) -> Option<Self> {
        match data {
            d if d == Self::Debris as u128 => Some(Self::Debris),
            d if d == Self::EnemyShip as u128 => Some(Self::EnemyShip),
            d if d == Self::Outpost as u128 => Some(Self::Outpost),
            d if d == Self::PlayerShip as u128 => Some(Self::PlayerShip),
            d if d == Self::Projectile as u128 => Some(Self::Projectile),
            _ => None,
        }
    }

    pub fn user_data(self) -> u128 {
        self as u128
    }

    fn group(self) -> Group {
        Group::from_bits_retain(self as u32)
    }

    /// Membership and filter for colliders carrying this tag.
    pub fn interaction_groups(self) -> InteractionGroups {
        let filter = match self {
            // Static geometry is hit by everything that moves.
            Self::Debris | Self::Outpost => Group::ALL,
            Self::EnemyShip => {
                Self::Debris.group()
                    | Self::Outpost.group()
                    | Self::PlayerShip.group()
                    | Self::Projectile.group()
                    | Self::EnemyShip.group()
            }
            Self::PlayerShip => {
                Self::Debris.group() | Self::EnemyShip.group() | Self::Projectile.group()
            }
            Self::Projectile => {
                Self::Debris.group()
                    | Self::Outpost.group()
                    | Self::EnemyShip.group()
                    | Self::PlayerShip.group()
            }
        };
        InteractionGroups::new(self.group(), filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_data_round_trips() {
        for tag in [
            ColliderTag::Debris,
            ColliderTag::EnemyShip,
            ColliderTag::Outpost,
            ColliderTag::PlayerShip,
            ColliderTag::Projectile,
        ] {
            assert_eq!(ColliderTag::from_user_data(tag.user_data()), Some(tag));
        }
        assert_eq!(ColliderTag::from_user_data(0), None);
    }

    #[test]
    fn projectiles_do_not_collide_with_each_other() {
        let groups = ColliderTag::Projectile.interaction_groups();
        assert!(!groups.filter.contains(ColliderTag::Projectile.group()));
        assert!(groups.filter.contains(ColliderTag::EnemyShip.group()));
    }
}
