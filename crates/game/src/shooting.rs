//! Enemy fire control.
//!
//! Each ship alternates between bursts and pauses of roughly
//! `shoot_period` seconds. A burst only opens when the pilot reports the ship
//! is lined up on the player; within a burst shots are spaced by the fire rate
//! plus a little jitter and aimed where the player will be.

use std::time::Duration;

use engine_core::Vec3;
use rand::Rng;

use crate::config::GunneryConfig;

/// Delay between deciding to open fire and the burst starting.
pub const ARM_DELAY: Duration = Duration::from_millis(100);

/// What fire control does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireDecision {
    /// Start a burst after the delay.
    Arm(Duration),
    /// Keep the current state for the delay, then stop firing.
    Hold(Duration),
}

/// Fire-control component.
#[derive(Debug, Clone)]
pub struct Gunnery {
    pub shots_per_sec: f32,
    pub shoot_period: f32,
    pub percentage_variation: u32,
    /// Lined up on the player as of the last pilot tick.
    pub eligible: bool,
    /// Inside a burst.
    pub firing: bool,
    /// A shot is queued. At most one shot chain runs per ship.
    pub shot_pending: bool,
    /// Player ship part this ship aims at. `None` aims at the ship origin.
    pub target_part: Option<usize>,
}

impl Gunnery {
    pub fn new(config: &GunneryConfig, target_part: Option<usize>) -> Self {
        Self {
            shots_per_sec: config.shots_per_sec,
            shoot_period: config.shoot_period,
            percentage_variation: config.percentage_variation,
            eligible: false,
            firing: false,
            shot_pending: false,
            target_part,
        }
    }

    pub fn decide<R: Rng>(&self, rng: &mut R) -> FireDecision {
        if !self.firing && self.eligible {
            FireDecision::Arm(ARM_DELAY)
        } else {
            FireDecision::Hold(self.cooldown(rng))
        }
    }

    /// Open a burst. Returns the delay to the first shot, or `None` when a
    /// shot from the previous burst is still queued and keeps the chain going.
    pub fn start_burst<R: Rng>(&mut self, rng: &mut R) -> Option<Duration> {
        self.firing = true;
        if self.shot_pending {
            return None;
        }
        self.shot_pending = true;
        Some(self.shot_delay(rng))
    }

    /// A queued shot went off. Returns the delay to the next one while the
    /// burst lasts; otherwise the chain ends here.
    pub fn shot_fired<R: Rng>(&mut self, rng: &mut R) -> Option<Duration> {
        self.shot_pending = self.firing;
        if self.firing {
            Some(self.shot_delay(rng))
        } else {
            None
        }
    }

    /// Cycle length with +/- `percentage_variation` percent of jitter.
    pub fn cooldown<R: Rng>(&self, rng: &mut R) -> Duration {
        let v = self.percentage_variation.min(99);
        let percent = rng.gen_range(100 - v..=100 + v) as f32;
        Duration::from_secs_f32(self.shoot_period * percent / 100.0)
    }

    /// Time until the next shot: the fire-rate interval plus up to a tenth of it.
    pub fn shot_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let interval = 1.0 / self.shots_per_sec;
        let jitter_max = (0.1 * interval).max(0.01);
        Duration::from_secs_f32(interval + rng.gen_range(0.01..=jitter_max))
    }
}

/// Lead a moving target. `velocity` is the target's displacement over the
/// last tick; the lead grows with range.
pub fn predict_intercept(target: Vec3, velocity: Vec3, distance: f32, divisor: f32) -> Vec3 {
    target + velocity * (distance / divisor)
}
