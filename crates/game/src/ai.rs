//! Enemy pilot state machine.
//!
//! States:
//! - SeekPlayer: fly straight at the player until in engagement range
//! - EngagePlayer: weave between waypoints around the player, shooting when lined up
//! - AvoidObstacle: follow a temporary point off to one side of an obstacle
//! - Wait: guards idle at their outpost
//! - ReturnToGuardLocation: guards that strayed too far head home
//!
//! Sensing and transitions happen before movement on every tick.

use engine_core::{look_rotation, EulerRot, Quat, Transform, Vec3};
use physics::{ColliderTag, SpatialQuery};
use rand::Rng;

use crate::player::PlayerShip;
use crate::sensor::{AvoidInfo, AvoidSide, ObstacleSensor};
use crate::waypoints::{WaypointId, WaypointPool};

/// Engagement range. Also the upper bound for shooting.
pub const ENGAGE_DISTANCE: f32 = 400.0;
/// Turn rate when steering towards a target.
pub const ROTATION_SPEED: f32 = 1.3;
pub const WAYPOINT_REACHED_DISTANCE: f32 = 20.0;
/// Max angle between heading and the player for a shot, in degrees.
pub const SHOOT_MAX_ANGLE: f32 = 50.0;
/// Heading change used to dodge static obstacles, in degrees.
pub const AVOID_ROTATION: f32 = 45.0;
/// How far ahead the dodge point is placed.
pub const AVOID_DISTANCE: f32 = 200.0;
/// Guards this far from their post give up the chase.
pub const GUARD_TURN_BACK_DISTANCE: f32 = 500.0;
/// Returning guards stop once this close to their post.
pub const GUARD_PROTECT_DISTANCE: f32 = 100.0;
/// Max bank applied per tick, in degrees.
pub const MAX_BANK: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AiState {
    #[default]
    SeekPlayer,
    EngagePlayer,
    AvoidObstacle,
    Wait,
    ReturnToGuardLocation,
}

/// Where the pilot is currently steering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavTarget {
    /// A shared engagement waypoint, resolved against the player each tick.
    Pool(WaypointId),
    /// Temporary dodge point in world space.
    Avoid(Vec3),
    /// The guard post.
    Guard(Vec3),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

impl Turn {
    /// Sign of the yaw about the ship's up axis. Positive yaw turns left.
    fn yaw_sign(self) -> f32 {
        match self {
            Turn::Left => 1.0,
            Turn::Right => -1.0,
        }
    }

    /// Turn away from the side an obstacle appeared on.
    fn away_from(side: AvoidSide) -> Self {
        match side {
            AvoidSide::Left => Turn::Right,
            AvoidSide::Right => Turn::Left,
        }
    }
}

/// Everything a pilot reads from the rest of the simulation.
pub struct PilotView<'a> {
    pub player: &'a PlayerShip,
    pub pool: &'a WaypointPool,
    pub sensor: &'a ObstacleSensor,
    pub query: &'a dyn SpatialQuery,
    /// Per-tick probability of going mad.
    pub madness_chance: f64,
    pub dt: f32,
}

/// Outcome of one tick of thinking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Thought {
    /// Lined up on the player; fire control may open up.
    pub can_shoot: bool,
    /// Madness struck on this tick.
    pub went_mad: bool,
}

/// AI component of an enemy ship.
#[derive(Debug, Clone)]
pub struct Pilot {
    pub state: AiState,
    mad: bool,
    guard_location: Option<Vec3>,
    target: Option<NavTarget>,
    waypoints: Vec<WaypointId>,
    /// Kept while dodging so consecutive detections turn the same way.
    avoid_turn: Option<Turn>,
    last_yaw: f32,
}

impl Pilot {
    pub fn new(waypoints: Vec<WaypointId>) -> Self {
        Self {
            state: AiState::SeekPlayer,
            mad: false,
            guard_location: None,
            target: None,
            waypoints,
            avoid_turn: None,
            last_yaw: 0.0,
        }
    }

    /// A pilot that idles at `location` until the player comes close.
    pub fn guarding(location: Vec3, waypoints: Vec<WaypointId>) -> Self {
        Self {
            state: AiState::Wait,
            guard_location: Some(location),
            ..Self::new(waypoints)
        }
    }

    pub fn is_mad(&self) -> bool {
        self.mad
    }

    pub fn guard_location(&self) -> Option<Vec3> {
        self.guard_location
    }

    pub fn target(&self) -> Option<NavTarget> {
        self.target
    }

    pub fn waypoints(&self) -> &[WaypointId] {
        &self.waypoints
    }

    /// Draw a waypoint from this pilot's subset, never the one currently
    /// targeted unless it is the only one.
    pub fn next_waypoint<R: Rng>(&self, rng: &mut R) -> Option<WaypointId> {
        let current = match self.target {
            Some(NavTarget::Pool(id)) => Some(id),
            _ => None,
        };
        let candidates: Vec<WaypointId> = self
            .waypoints
            .iter()
            .copied()
            .filter(|id| Some(*id) != current)
            .collect();
        if candidates.is_empty() {
            return self.waypoints.first().copied();
        }
        Some(candidates[rng.gen_range(0..candidates.len())])
    }

    /// Run one tick of sensing, transitions and movement.
    pub fn think<R: Rng>(
        &mut self,
        transform: &mut Transform,
        speed: f32,
        view: &PilotView,
        rng: &mut R,
    ) -> Thought {
        let player_pos = view.player.position();

        // Mad ships only ram.
        if self.mad {
            fly_at(transform, player_pos, speed, view.dt);
            return Thought::default();
        }

        let mut thought = Thought::default();
        if rng.gen::<f64>() < view.madness_chance {
            self.mad = true;
            thought.went_mad = true;
        }

        let distance = transform.position.distance(player_pos);

        // Returning guards may close inside the outpost's sensor range.
        if let AvoidInfo::Obstacle { tag, side } = view.sensor.check(transform, view.query) {
            if !(self.state == AiState::ReturnToGuardLocation && tag == ColliderTag::Outpost) {
                self.react_to_obstacle(transform, tag, side, rng);
            }
        }

        let to_player = player_pos - transform.position;
        let angle = transform.forward().angle_between(to_player).to_degrees();
        let mut can_shoot = distance < ENGAGE_DISTANCE
            && angle < SHOOT_MAX_ANGLE
            && view.player.is_in_front(transform.position);

        if self.state == AiState::AvoidObstacle {
            if self.fly_to_target(transform, speed, view, rng) {
                self.state = AiState::SeekPlayer;
                self.avoid_turn = None;
            }
        } else {
            let strayed = self.guard_location.filter(|guard| {
                self.state != AiState::ReturnToGuardLocation
                    && transform.position.distance(*guard) >= GUARD_TURN_BACK_DISTANCE
            });
            if let Some(guard) = strayed {
                self.state = AiState::ReturnToGuardLocation;
                self.target = Some(NavTarget::Guard(guard));
            } else if matches!(self.state, AiState::SeekPlayer | AiState::Wait) && distance <= ENGAGE_DISTANCE {
                self.state = AiState::EngagePlayer;
                self.target = self.next_waypoint(rng).map(NavTarget::Pool);
            } else if self.state == AiState::EngagePlayer && distance > ENGAGE_DISTANCE {
                self.state = AiState::SeekPlayer;
            }

            match self.state {
                AiState::EngagePlayer => {
                    self.fly_to_target(transform, speed, view, rng);
                }
                AiState::SeekPlayer => {
                    can_shoot = false;
                    fly_at(transform, player_pos, speed, view.dt);
                }
                AiState::ReturnToGuardLocation => {
                    self.fly_to_target(transform, speed, view, rng);
                    let home = self
                        .guard_location
                        .is_some_and(|guard| transform.position.distance(guard) < GUARD_PROTECT_DISTANCE);
                    if home {
                        self.state = AiState::Wait;
                        self.target = None;
                    }
                }
                AiState::Wait | AiState::AvoidObstacle => {}
            }
        }

        thought.can_shoot = can_shoot && !self.mad;
        thought
    }

    fn react_to_obstacle<R: Rng>(&mut self, transform: &Transform, tag: ColliderTag, side: AvoidSide, rng: &mut R) {
        // A spent dodge or guard target is dropped before picking a new one.
        if matches!(self.target, Some(NavTarget::Avoid(_) | NavTarget::Guard(_))) {
            self.target = None;
        }

        if tag == ColliderTag::EnemyShip {
            // The other ship is unlikely to pick the same waypoint.
            self.state = AiState::EngagePlayer;
            self.avoid_turn = None;
            self.target = self.next_waypoint(rng).map(NavTarget::Pool);
            return;
        }

        self.state = AiState::AvoidObstacle;
        let turn = *self.avoid_turn.get_or_insert(Turn::away_from(side));
        self.target = Some(NavTarget::Avoid(avoid_point(transform, turn)));
    }

    fn resolve(&self, target: NavTarget, view: &PilotView) -> Option<Vec3> {
        match target {
            NavTarget::Pool(id) => view.pool.world_position(id, &view.player.transform),
            NavTarget::Avoid(point) | NavTarget::Guard(point) => Some(point),
        }
    }

    /// Steer towards the current target. Returns true when it was reached, in
    /// which case the next pool waypoint becomes the target.
    fn fly_to_target<R: Rng>(&mut self, transform: &mut Transform, speed: f32, view: &PilotView, rng: &mut R) -> bool {
        let Some(goal) = self.target.and_then(|t| self.resolve(t, view)) else {
            return false;
        };

        if let Some(look) = look_rotation(goal - transform.position, Vec3::Y) {
            let t = (view.dt * ROTATION_SPEED).min(1.0);
            transform.rotation = transform.rotation.slerp(look, t).normalize();
        }

        let yaw = yaw_degrees(transform.rotation);
        let bank = wrap_degrees(self.last_yaw - yaw).clamp(0.0, MAX_BANK);
        if bank > 0.0 {
            transform.rotation = (transform.rotation * Quat::from_rotation_z(bank.to_radians())).normalize();
        }
        self.last_yaw = yaw_degrees(transform.rotation);

        let step = transform.forward() * speed * view.dt;
        transform.translate(step);

        if transform.position.distance(goal) >= WAYPOINT_REACHED_DISTANCE {
            return false;
        }
        if matches!(self.target, Some(NavTarget::Avoid(_))) {
            self.target = None;
        }
        self.target = self.next_waypoint(rng).map(NavTarget::Pool);
        true
    }
}

/// Snap to face `target` and move forward.
fn fly_at(transform: &mut Transform, target: Vec3, speed: f32, dt: f32) {
    transform.look_at(target, Vec3::Y);
    let step = transform.forward() * speed * dt;
    transform.translate(step);
}

/// Dodge point: `AVOID_DISTANCE` ahead on the heading yawed towards `turn`.
fn avoid_point(transform: &Transform, turn: Turn) -> Vec3 {
    let yaw = Quat::from_axis_angle(transform.up(), turn.yaw_sign() * AVOID_ROTATION.to_radians());
    transform.position + yaw * transform.forward() * AVOID_DISTANCE
}

fn yaw_degrees(rotation: Quat) -> f32 {
    rotation.to_euler(EulerRot::YXZ).0.to_degrees()
}

/// Map an angle in degrees into (-180, 180].
fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}
