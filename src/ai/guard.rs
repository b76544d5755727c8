//! Guard behavior controller
//!
//! One `GuardBehavior` per guard. Each tick it:
//!
//! 1. Updates suspicion (or the de-aggro countdown while chasing)
//! 2. Evaluates the current state's transition rule and commits it,
//!    subject to the minimum dwell time
//! 3. Picks a target location for the (possibly new) state
//! 4. Asks the path planner for the next step toward it
//! 5. Publishes a normalized movement direction
//!
//! Nothing here can fail. Inconsistent state degrades to a zero direction
//! for the tick, and a missing path degrades to heading straight for the
//! target.

use std::f32::consts::TAU;

use glam::Vec2;

use super::movement::seek;
use super::state::{GuardState, Transition};
use super::suspicion::{DeAggroTimer, Suspicion, gain_rate};
use super::transitions::{Signals, may_commit, next_state};
use crate::core::GuardConfig;
use crate::nav::PathPlanner;
use crate::perception::Sighting;

/// A noise the guard has decided to investigate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Distraction {
    pub position: Vec2,
    /// Higher values override lower ones
    pub priority: u8,
}

/// What the guard perceived about its target this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Observation {
    /// Set when the target is in the cone and in line of sight
    pub sighting: Option<Sighting>,
    /// Live position of the aggro target, if it still exists
    pub target_position: Option<Vec2>,
    /// Target cannot be caught right now (e.g. respawning)
    pub target_invulnerable: bool,
}

impl Observation {
    #[must_use]
    pub fn seen(sighting: Sighting) -> Self {
        Self {
            sighting: Some(sighting),
            target_position: Some(sighting.position),
            target_invulnerable: false,
        }
    }

    /// Target exists at `position` but is not visible
    #[must_use]
    pub fn unseen(position: Vec2) -> Self {
        Self {
            target_position: Some(position),
            ..Self::default()
        }
    }
}

/// Per-guard hierarchical state machine
#[derive(Debug, Clone)]
pub struct GuardBehavior {
    config: GuardConfig,
    /// Distance at which suspicion gain bottoms out
    sight_range: f32,

    state: GuardState,
    ticks_in_state: u32,
    /// Seconds in the current state
    state_time: f32,

    suspicion: Suspicion,
    de_aggro: DeAggroTimer,
    /// Live target position from the latest observation
    tracked: Option<Vec2>,
    last_seen: Option<Vec2>,
    target_invulnerable: bool,
    sighted: Option<Sighting>,

    /// Pending camera alert position (the flag is `is_some`)
    camera_alert: Option<Vec2>,
    camera_watching: bool,
    /// Alert position captured on entering `Alerted`
    alert_position: Option<Vec2>,
    distraction: Option<Distraction>,

    patrol: Vec<Vec2>,
    patrol_index: usize,
    home: Vec2,

    facing: f32,
    /// Facing captured on entering `LookingAround`
    look_base: f32,

    target: Option<Vec2>,
    /// Last destination paired with the reachable point standing in for it
    goal: Option<(Vec2, Vec2)>,
    direction: Vec2,
    path_fallback: bool,
}

impl GuardBehavior {
    /// Create a patrolling guard standing at `home`
    #[must_use]
    pub fn new(config: GuardConfig, home: Vec2, facing: f32) -> Self {
        Self {
            suspicion: Suspicion::new(config.max_suspicion),
            config,
            sight_range: 8.0,
            state: GuardState::Patrol,
            ticks_in_state: 0,
            state_time: 0.0,
            de_aggro: DeAggroTimer::default(),
            tracked: None,
            last_seen: None,
            target_invulnerable: false,
            sighted: None,
            camera_alert: None,
            camera_watching: false,
            alert_position: None,
            distraction: None,
            patrol: Vec::new(),
            patrol_index: 0,
            home,
            facing,
            look_base: facing,
            target: None,
            goal: None,
            direction: Vec2::ZERO,
            path_fallback: false,
        }
    }

    /// Set the patrol route, starting at its first point
    #[must_use]
    pub fn with_patrol(mut self, waypoints: Vec<Vec2>) -> Self {
        self.patrol = waypoints;
        self.patrol_index = 0;
        self
    }

    /// Set the range over which suspicion gain falls from near to far
    #[must_use]
    pub fn with_sight_range(mut self, range: f32) -> Self {
        self.sight_range = range;
        self
    }

    // ------------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------------

    /// Provide this tick's perception. Consumed by the next `update`.
    pub fn observe(&mut self, observation: Observation) {
        self.sighted = observation.sighting;
        self.tracked = observation.target_position;
        self.target_invulnerable = observation.target_invulnerable;
    }

    /// A camera saw the player at `position`.
    ///
    /// Refreshes the destination if already alerted; ignored while chasing.
    pub fn raise_camera_alert(&mut self, position: Vec2) {
        match self.state {
            GuardState::Chase => {}
            GuardState::Alerted => self.alert_position = Some(position),
            _ => self.camera_alert = Some(position),
        }
    }

    /// Whether the player is currently under camera surveillance
    pub fn set_camera_watching(&mut self, watching: bool) {
        self.camera_watching = watching;
    }

    /// Offer a distraction. Returns whether the guard took it.
    ///
    /// Only patrolling, distracted or looking-around guards listen, and a
    /// lower priority never replaces the current distraction.
    pub fn distract(&mut self, position: Vec2, priority: u8) -> bool {
        if !self.state.accepts_distractions() {
            return false;
        }
        if self.distraction.is_some_and(|d| priority < d.priority) {
            return false;
        }
        self.distraction = Some(Distraction { position, priority });
        true
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advance one tick. Returns the committed state change, if any.
    pub fn update(
        &mut self,
        dt: f32,
        position: Vec2,
        planner: &impl PathPlanner,
    ) -> Option<Transition> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.ticks_in_state = self.ticks_in_state.saturating_add(1);
        self.state_time += dt;

        self.update_suspicion(dt);
        let transition = self.evaluate_transitions(position);
        self.target = self.select_target(position);
        self.steer(position, planner);

        self.sighted = None;
        transition
    }

    fn update_suspicion(&mut self, dt: f32) {
        if let Some(sighting) = self.sighted {
            self.last_seen = Some(sighting.position);
        }

        if self.state == GuardState::Chase {
            if self.sighted.is_some() {
                self.de_aggro.reset(self.config.de_aggro_time);
            } else if !self.camera_watching {
                self.de_aggro.tick(dt);
            }
            return;
        }

        match self.sighted {
            Some(_) if self.camera_watching => self.suspicion.fill(),
            Some(sighting) => {
                let rate = gain_rate(&self.config, sighting.distance, self.sight_range);
                self.suspicion.raise(rate * dt);
            }
            None => self.suspicion.decay(self.config.suspicion_decay_rate * dt),
        }
    }

    fn evaluate_transitions(&mut self, position: Vec2) -> Option<Transition> {
        let signals = Signals {
            suspicion_max: self.suspicion.is_max(),
            suspicious: self.suspicion.level() >= self.config.suspicious_threshold,
            de_aggro_expired: self.de_aggro.is_expired(),
            target_invulnerable: self.target_invulnerable,
            camera_alert: self.camera_alert.is_some(),
            distraction: self.distraction.is_some(),
            arrived: self.arrived(position),
            look_around_done: self.state_time >= self.config.look_around_time,
        };

        let next = next_state(self.state, &signals);
        if next == self.state || !may_commit(next, self.ticks_in_state, self.config.min_state_ticks)
        {
            return None;
        }

        let from = self.state;
        self.switch_to(next);
        log::debug!(
            "Guard {} -> {} (suspicion {:.1})",
            from,
            next,
            self.suspicion.level()
        );
        Some(Transition { from, to: next })
    }

    /// Whether the current state's destination is within arrival radius.
    /// A missing destination counts as reached so the guard can recover.
    fn arrived(&self, position: Vec2) -> bool {
        let destination = match self.state {
            GuardState::Alerted => self.alert_position,
            GuardState::Distracted => self.distraction.map(|d| d.position),
            _ => return false,
        };
        destination.is_none_or(|p| self.reached(position, p))
    }

    /// Within arrival radius of `destination`, or of the walkable point the
    /// planner substituted for it
    fn reached(&self, position: Vec2, destination: Vec2) -> bool {
        let goal = match self.goal {
            Some((raw, reachable)) if raw == destination => reachable,
            _ => destination,
        };
        position.distance(goal) <= self.config.arrival_radius
    }

    /// Run exit and enter effects and reset the dwell counters
    fn switch_to(&mut self, next: GuardState) {
        let from = self.state;

        match from {
            GuardState::Distracted if next != GuardState::LookingAround => self.distraction = None,
            GuardState::Alerted => self.alert_position = None,
            _ => {}
        }
        if !next.accepts_distractions() {
            self.distraction = None;
        }

        match next {
            GuardState::Chase => {
                self.suspicion.fill();
                self.de_aggro.reset(self.config.de_aggro_time);
                self.camera_alert = None;
            }
            GuardState::Suspicious if from == GuardState::Chase => {
                let midpoint = (self.config.suspicious_threshold + self.config.max_suspicion) * 0.5;
                self.suspicion.set(midpoint);
            }
            GuardState::Alerted => {
                self.alert_position = self.camera_alert.take();
            }
            GuardState::LookingAround => {
                self.look_base = self.facing;
                self.distraction = None;
            }
            _ => {}
        }

        self.state = next;
        self.ticks_in_state = 0;
        self.state_time = 0.0;
    }

    /// Jump straight to `state`, running its enter effects. No debounce.
    pub fn force_state(&mut self, state: GuardState) {
        if state != self.state {
            self.switch_to(state);
        }
    }

    fn select_target(&mut self, position: Vec2) -> Option<Vec2> {
        match self.state {
            GuardState::Patrol => Some(self.patrol_target(position)),
            GuardState::Suspicious | GuardState::Chase => self.tracked.or(self.last_seen),
            GuardState::Alerted => self.alert_position,
            GuardState::Distracted => self.distraction.map(|d| d.position),
            GuardState::LookingAround => Some(position),
        }
    }

    /// Current patrol waypoint, advancing past it once reached
    fn patrol_target(&mut self, position: Vec2) -> Vec2 {
        let Some(&current) = self.patrol.get(self.patrol_index) else {
            return self.home;
        };
        if self.reached(position, current) {
            self.patrol_index = (self.patrol_index + 1) % self.patrol.len();
            return self.patrol[self.patrol_index];
        }
        current
    }

    fn steer(&mut self, position: Vec2, planner: &impl PathPlanner) {
        self.path_fallback = false;

        if self.state == GuardState::LookingAround {
            let period = self.config.look_around_period;
            let phase = if period > 0.0 {
                TAU * self.state_time / period
            } else {
                0.0
            };
            self.facing = self.look_base + self.config.look_around_sweep * phase.sin();
            self.direction = Vec2::from_angle(self.facing);
            return;
        }

        let Some(target) = self.target else {
            log::warn!("Guard in {} has no target, holding still", self.state);
            self.direction = Vec2::ZERO;
            return;
        };

        let goal = planner.reachable_goal(target);
        self.goal = Some((target, goal));

        let waypoint = planner.next_waypoint(position, goal).unwrap_or_else(|| {
            log::trace!("No path from {position} to {goal}, heading straight");
            self.path_fallback = true;
            goal
        });

        self.direction = seek(position, waypoint);
        if self.direction != Vec2::ZERO {
            self.facing = self.direction.y.atan2(self.direction.x);
        }
    }

    // ------------------------------------------------------------------------
    // Outputs
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Unit direction to move in, or zero to stand still.
    ///
    /// While looking around this is the facing direction and the guard
    /// should not translate.
    #[must_use]
    pub fn movement_direction(&self) -> Vec2 {
        self.direction
    }

    /// Target location chosen on the last update
    #[must_use]
    pub fn next_target(&self) -> Option<Vec2> {
        self.target
    }

    /// Facing angle in radians
    #[must_use]
    pub fn facing(&self) -> f32 {
        self.facing
    }

    #[must_use]
    pub fn suspicion(&self) -> &Suspicion {
        &self.suspicion
    }

    /// Seconds left before a chase is abandoned
    #[must_use]
    pub fn de_aggro_remaining(&self) -> f32 {
        self.de_aggro.remaining()
    }

    #[must_use]
    pub fn camera_alert(&self) -> Option<Vec2> {
        self.camera_alert
    }

    #[must_use]
    pub fn distraction(&self) -> Option<Distraction> {
        self.distraction
    }

    #[must_use]
    pub fn patrol_index(&self) -> usize {
        self.patrol_index
    }

    /// Whether the last update had to head straight for the target
    #[must_use]
    pub fn used_path_fallback(&self) -> bool {
        self.path_fallback
    }

    #[must_use]
    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    #[must_use]
    pub fn ticks_in_state(&self) -> u32 {
        self.ticks_in_state
    }
}
