//! Guard AI module
//!
//! Suspicion, the guard state machine, security cameras and the movement
//! commands they produce.

mod arena;
mod camera;
mod guard;
mod movement;
mod state;
mod suspicion;
mod transitions;

pub use arena::{Arena, GuardId};
pub use camera::SecurityCamera;
pub use guard::{Distraction, GuardBehavior, Observation};
pub use movement::{MovementCommand, force_for, seek};
pub use state::{GuardState, Transition};
pub use suspicion::{DeAggroTimer, Suspicion, gain_rate};
pub use transitions::{Signals, may_commit, next_state};
