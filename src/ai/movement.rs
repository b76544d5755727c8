//! Movement output consumed by the physics collaborator
//!
//! The AI never touches velocities. It publishes one command per guard per
//! tick and the caller turns it into body motion.

use glam::Vec2;

use super::arena::GuardId;
use super::state::GuardState;
use crate::core::GuardConfig;
use crate::perception::BodyId;

/// Unit direction from `position` toward `target`, or zero when already there
#[must_use]
pub fn seek(position: Vec2, target: Vec2) -> Vec2 {
    (target - position).normalize_or_zero()
}

/// Force scalar for a state. Looking around never translates.
#[must_use]
pub fn force_for(state: GuardState, config: &GuardConfig) -> f32 {
    match state {
        GuardState::Patrol => config.patrol_force,
        GuardState::Suspicious | GuardState::Alerted | GuardState::Distracted => {
            config.alert_force
        }
        GuardState::Chase => config.chase_force,
        GuardState::LookingAround => 0.0,
    }
}

/// What one guard wants to do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementCommand {
    pub guard: GuardId,
    pub body: BodyId,
    /// Normalized direction, or zero
    pub direction: Vec2,
    /// Facing angle in radians
    pub facing: f32,
    /// Force scalar; zero means turn in place
    pub force: f32,
}

impl MovementCommand {
    /// Stand still, keeping the given facing
    #[must_use]
    pub fn idle(guard: GuardId, body: BodyId, facing: f32) -> Self {
        Self {
            guard,
            body,
            direction: Vec2::ZERO,
            facing,
            force: 0.0,
        }
    }

    /// Planar velocity for a body whose top speed at unit force is `speed`
    #[must_use]
    pub fn velocity(&self, speed: f32) -> Vec2 {
        self.direction * self.force * speed
    }

    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.force > 0.0 && self.direction != Vec2::ZERO
    }
}
