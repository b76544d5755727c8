//! Core module
//!
//! Configuration, level data, the per-tick simulation and the event and
//! debug plumbing around it.

mod config;
mod debug;
mod events;
mod level;
mod simulation;

pub use config::{AiConfig, CameraConfig, GuardConfig, SightConfig, VisionConfig};
pub use debug::{DebugInfo, GuardDebug, TickStats};
pub use events::{AiEvent, EventQueue};
pub use level::{CameraSpawn, Door, GuardSpawn, LevelData, LevelError};
pub use simulation::{GuardAgent, LevelBodies, PlayerTarget, Simulation};
