//! Time management for the fixed-rate simulation loop.

use std::time::Duration;

/// Simulation clock. Advanced explicitly by the owner of the tick loop, so the
/// same code runs identically under a real-time server loop and in tests.
#[derive(Debug)]
pub struct Time {
    /// Duration of the last tick.
    delta: Duration,
    /// Total simulated time since start.
    elapsed: Duration,
    /// Tick count since start.
    frame_count: u64,
    /// Fixed timestep (default 60 Hz).
    fixed_timestep: Duration,
    /// Accumulated wall time not yet consumed by fixed ticks.
    accumulator: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new clock at t = 0.
    pub fn new() -> Self {
        Self {
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / 60.0),
            accumulator: Duration::ZERO,
        }
    }

    /// Advance the clock by one tick of length `delta`.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get total elapsed time as Duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the current tick count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the fixed timestep as a Duration.
    pub fn fixed_timestep(&self) -> Duration {
        self.fixed_timestep
    }

    /// Set the fixed timestep rate in Hz.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        self.fixed_timestep = Duration::from_secs_f64(1.0 / hz);
    }

    /// Feed wall-clock time into the accumulator.
    pub fn accumulate(&mut self, wall: Duration) {
        self.accumulator += wall;
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_elapsed_and_frames() {
        let mut time = Time::new();
        time.advance(Duration::from_millis(100));
        time.advance(Duration::from_millis(50));
        assert_eq!(time.elapsed(), Duration::from_millis(150));
        assert_eq!(time.frame_count(), 2);
        assert!((time.delta_seconds() - 0.05).abs() < 1e-6);
    }

    #[test]
    fn fixed_update_consumes_accumulator() {
        let mut time = Time::new();
        time.set_fixed_rate(10.0);
        time.accumulate(Duration::from_millis(250));
        assert!(time.should_fixed_update());
        assert!(time.should_fixed_update());
        assert!(!time.should_fixed_update());
    }
}
