//! Guard AI for top-down stealth games
//!
//! This crate provides:
//! - Tile navigation grids with A* and path smoothing
//! - Vision cones and multi-ray line of sight against a physics world
//! - A hierarchical guard state machine driven by suspicion
//! - Security cameras and distractions
//! - A 2D rapier3d backend for the physics queries

pub mod ai;
pub mod core;
pub mod nav;
pub mod perception;
pub mod physics;

// Re-exports for convenience
pub use glam;
pub use rapier3d;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::ai::{GuardBehavior, GuardId, GuardState, MovementCommand, SecurityCamera};
    pub use crate::core::{
        AiConfig, AiEvent, CameraConfig, GuardConfig, LevelData, PlayerTarget, SightConfig,
        Simulation, VisionConfig,
    };
    pub use crate::nav::{GridPlanner, GridSpec, NavGrid, ObstacleRect, PathPlanner, TileCoord};
    pub use crate::perception::{BodyId, PerceptionService, PhysicsQuery, VisionCone};
    pub use crate::physics::{ColliderHandle, Physics};
    pub use glam::Vec2;
}
