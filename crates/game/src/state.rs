//! Shared game state: match status, scores, resources, tracked enemies and outposts.

use std::collections::HashMap;

use engine_core::{Entity, Vec3, World};

// ── Match ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    /// Lobby; nothing spawns.
    #[default]
    Waiting,
    Started,
    Finished,
}

/// Connected player, as assigned by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

// ── Outposts ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutpostId(usize);

impl OutpostId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A station holding resources the crew can pick up once.
#[derive(Debug, Clone, PartialEq)]
pub struct Outpost {
    pub location: Vec3,
    pub resources: u32,
    pub resources_collected: bool,
}

// ── State ──────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct GameState {
    status: GameStatus,
    scores: HashMap<PlayerId, u32>,
    kills: HashMap<PlayerId, u32>,
    ship_resources: u64,
    /// Enemies the clients are told about. May briefly lag the world.
    enemies: Vec<Entity>,
    outposts: Vec<Outpost>,
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn set_status(&mut self, status: GameStatus) {
        if self.status != status {
            log::info!("Game status {:?} -> {:?}", self.status, status);
            self.status = status;
        }
    }

    pub fn add_player_score(&mut self, player: PlayerId, amount: u32) {
        *self.scores.entry(player).or_default() += amount;
    }

    pub fn add_kill(&mut self, player: PlayerId) {
        *self.kills.entry(player).or_default() += 1;
    }

    pub fn player_score(&self, player: PlayerId) -> u32 {
        self.scores.get(&player).copied().unwrap_or(0)
    }

    pub fn player_kills(&self, player: PlayerId) -> u32 {
        self.kills.get(&player).copied().unwrap_or(0)
    }

    pub fn add_ship_resources(&mut self, amount: u32) {
        self.ship_resources += u64::from(amount);
    }

    pub fn ship_resources(&self) -> u64 {
        self.ship_resources
    }

    pub fn add_enemy(&mut self, enemy: Entity) {
        self.enemies.push(enemy);
    }

    pub fn remove_enemy(&mut self, enemy: Entity) -> bool {
        let before = self.enemies.len();
        self.enemies.retain(|e| *e != enemy);
        self.enemies.len() != before
    }

    pub fn enemies(&self) -> &[Entity] {
        &self.enemies
    }

    /// Drop tracked enemies that no longer exist in `world`. Returns how many went.
    pub fn cleanup_enemies(&mut self, world: &World) -> usize {
        let before = self.enemies.len();
        self.enemies.retain(|e| world.contains(*e));
        let purged = before - self.enemies.len();
        if purged > 0 {
            log::debug!("Purged {} stale enemies", purged);
        }
        purged
    }

    pub fn add_outpost(&mut self, location: Vec3, resources: u32) -> OutpostId {
        self.outposts.push(Outpost {
            location,
            resources,
            resources_collected: false,
        });
        OutpostId(self.outposts.len() - 1)
    }

    pub fn outpost(&self, id: OutpostId) -> Option<&Outpost> {
        self.outposts.get(id.0)
    }

    pub fn outposts(&self) -> &[Outpost] {
        &self.outposts
    }

    /// Credit an outpost's resources to the ship. Only the first call pays out.
    pub fn collect_outpost(&mut self, id: OutpostId) -> Option<u32> {
        let outpost = self.outposts.get_mut(id.0)?;
        if outpost.resources_collected {
            return None;
        }
        outpost.resources_collected = true;
        let amount = outpost.resources;
        self.add_ship_resources(amount);
        log::info!("Collected {} resources from outpost {}", amount, id.0);
        Some(amount)
    }
}
