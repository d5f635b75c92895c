//! Sky Base - server-side enemy simulation.
//!
//! Enemy pilots, fire control, damage and the population manager for a
//! multiplayer space combat game. Rendering, networking and input live
//! elsewhere; this crate only advances the authoritative state.

pub mod ai;
pub mod combat;
pub mod config;
pub mod enemy;
pub mod error;
pub mod player;
pub mod pool;
pub mod sampling;
pub mod sensor;
pub mod shooting;
pub mod sim;
pub mod spawner;
pub mod state;
pub mod timers;
pub mod waypoints;

#[cfg(test)]
mod test_support;

pub use combat::{DamageOutcome, DamageSource};
pub use config::SimConfig;
pub use error::ConfigError;
pub use player::{PlayerShip, ShipPart};
pub use sim::{SimEvent, Simulation};
pub use state::{GameStatus, PlayerId};
