//! The player mothership as the enemies see it.
//!
//! Movement is driven from outside the simulation; enemies only need its
//! frame, a per-tick velocity estimate for leading shots, and the bounds of
//! the parts worth shooting at.

use engine_core::{Aabb, Transform, Vec3};
use rand::Rng;

/// A named sub-volume of the ship, bounds in the ship's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ShipPart {
    pub name: String,
    pub bounds: Aabb,
}

impl ShipPart {
    pub fn new(name: impl Into<String>, center: Vec3, half_extents: Vec3) -> Self {
        Self {
            name: name.into(),
            bounds: Aabb::from_center_half_extents(center, half_extents),
        }
    }

    /// Engines, hull sections and the bridge draw fire; fittings do not.
    pub fn is_targetable(&self) -> bool {
        self.name.contains("Engine") || self.name.contains("Hull") || self.name == "CaptainBridge"
    }
}

#[derive(Debug, Clone)]
pub struct PlayerShip {
    pub transform: Transform,
    parts: Vec<ShipPart>,
    previous_position: Vec3,
    sampled_position: Vec3,
}

impl PlayerShip {
    pub fn new(transform: Transform, parts: Vec<ShipPart>) -> Self {
        Self {
            transform,
            parts,
            previous_position: transform.position,
            sampled_position: transform.position,
        }
    }

    /// The stock mothership layout.
    pub fn mothership(transform: Transform) -> Self {
        Self::new(
            transform,
            vec![
                ShipPart::new("MainHull", Vec3::ZERO, Vec3::new(12.0, 8.0, 40.0)),
                ShipPart::new("LeftEngine", Vec3::new(-16.0, 0.0, 34.0), Vec3::new(4.0, 4.0, 8.0)),
                ShipPart::new("RightEngine", Vec3::new(16.0, 0.0, 34.0), Vec3::new(4.0, 4.0, 8.0)),
                ShipPart::new("CaptainBridge", Vec3::new(0.0, 11.0, -12.0), Vec3::new(4.0, 3.0, 6.0)),
                ShipPart::new("Antenna", Vec3::new(0.0, 16.0, 4.0), Vec3::new(0.5, 5.0, 0.5)),
            ],
        )
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Record this tick's position. Call once per tick before anyone reads
    /// [`Self::velocity_estimate`].
    pub fn sample(&mut self) {
        self.previous_position = self.sampled_position;
        self.sampled_position = self.transform.position;
    }

    /// Displacement over the last tick.
    pub fn velocity_estimate(&self) -> Vec3 {
        self.sampled_position - self.previous_position
    }

    pub fn parts(&self) -> &[ShipPart] {
        &self.parts
    }

    pub fn targetable_parts(&self) -> impl Iterator<Item = (usize, &ShipPart)> {
        self.parts.iter().enumerate().filter(|(_, p)| p.is_targetable())
    }

    /// Pick a random targetable part, if the ship has any.
    pub fn random_target_part<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        let targetable: Vec<usize> = self.targetable_parts().map(|(i, _)| i).collect();
        if targetable.is_empty() {
            return None;
        }
        Some(targetable[rng.gen_range(0..targetable.len())])
    }

    /// World-space centre of a part, or the ship origin for an unknown index.
    pub fn part_world_center(&self, index: Option<usize>) -> Vec3 {
        match index.and_then(|i| self.parts.get(i)) {
            Some(part) => self.transform.transform_point(part.bounds.center()),
            None => self.transform.position,
        }
    }

    /// Local bounds that waypoints must stay out of.
    pub fn exclusion_bounds(&self) -> Vec<Aabb> {
        self.targetable_parts().map(|(_, p)| p.bounds).collect()
    }

    /// Whether `point` lies in the half-space ahead of the ship.
    pub fn is_in_front(&self, point: Vec3) -> bool {
        (point - self.transform.position).dot(self.transform.forward()) > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn targetable_parts_match_naming() {
        let ship = PlayerShip::mothership(Transform::default());
        let names: Vec<&str> = ship.targetable_parts().map(|(_, p)| p.name.as_str()).collect();
        assert_eq!(names, ["MainHull", "LeftEngine", "RightEngine", "CaptainBridge"]);
        assert_eq!(ship.exclusion_bounds().len(), 4);
    }

    #[test]
    fn velocity_estimate_is_last_tick_delta() {
        let mut ship = PlayerShip::mothership(Transform::default());
        ship.sample();
        assert_eq!(ship.velocity_estimate(), Vec3::ZERO);

        ship.transform.position = Vec3::new(0.0, 0.0, -3.0);
        ship.sample();
        assert_eq!(ship.velocity_estimate(), Vec3::new(0.0, 0.0, -3.0));

        ship.sample();
        assert_eq!(ship.velocity_estimate(), Vec3::ZERO);
    }

    #[test]
    fn front_is_negative_z() {
        let ship = PlayerShip::mothership(Transform::default());
        assert!(ship.is_in_front(Vec3::new(0.0, 0.0, -100.0)));
        assert!(!ship.is_in_front(Vec3::new(0.0, 0.0, 100.0)));
    }

    #[test]
    fn random_target_is_targetable() {
        let ship = PlayerShip::mothership(Transform::from_position(Vec3::X * 10.0));
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..20 {
            let index = ship.random_target_part(&mut rng);
            assert!(index.is_some_and(|i| ship.parts()[i].is_targetable()));
        }
        assert_eq!(ship.part_world_center(None), Vec3::X * 10.0);
        assert_eq!(ship.part_world_center(Some(0)), Vec3::X * 10.0);
    }
}
