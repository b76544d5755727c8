//! Level description
//!
//! Everything the AI core needs from a level: grid layout, static
//! geometry, doors, guard and camera placements, and the AI tuning.
//! Stored as RON (Rusty Object Notation) or JSON.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::config::AiConfig;
use crate::nav::{GridSpec, NavGrid, ObstacleRect};

/// Errors raised while loading, saving or validating a level
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid level: {0}")]
    Invalid(String),
}

/// A door footprint. Door tiles stay walkable in the graph; a closed door
/// only flips their obstacle flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Door {
    pub rect: ObstacleRect,
    #[serde(default)]
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardSpawn {
    pub position: Vec2,
    /// Initial facing in radians
    #[serde(default)]
    pub facing: f32,
    /// Patrol route, visited in order and looped
    #[serde(default)]
    pub patrol: Vec<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSpawn {
    pub position: Vec2,
    /// Mounted facing the sweep is centred on
    #[serde(default)]
    pub facing: f32,
}

fn default_version() -> u32 {
    1
}

/// A serializable level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    pub name: String,
    /// Format version for compatibility
    #[serde(default = "default_version")]
    pub version: u32,
    pub grid: GridSpec,
    /// Wall footprints
    #[serde(default)]
    pub walls: Vec<ObstacleRect>,
    #[serde(default)]
    pub doors: Vec<Door>,
    #[serde(default)]
    pub guards: Vec<GuardSpawn>,
    #[serde(default)]
    pub cameras: Vec<CameraSpawn>,
    #[serde(default)]
    pub player_spawn: Vec2,
    #[serde(default)]
    pub ai: AiConfig,
}

impl LevelData {
    /// Create an empty level over `grid`
    #[must_use]
    pub fn new(name: impl Into<String>, grid: GridSpec) -> Self {
        Self {
            name: name.into(),
            version: default_version(),
            grid,
            walls: Vec::new(),
            doors: Vec::new(),
            guards: Vec::new(),
            cameras: Vec::new(),
            player_spawn: Vec2::ZERO,
            ai: AiConfig::default(),
        }
    }

    /// Parse and validate a RON level
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid RON or the level is invalid.
    pub fn from_ron_str(text: &str) -> Result<Self, LevelError> {
        let level: Self = ron::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    /// Serialize to pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_ron_string(&self) -> Result<String, LevelError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Load a level from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the level
    /// is invalid.
    pub fn load_ron(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let content = fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    /// Save the level to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Parse and validate a JSON level
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or the level is invalid.
    pub fn from_json_str(text: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(text)?;
        level.validate()?;
        Ok(level)
    }

    /// Load a level from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the level
    /// is invalid.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Save the level to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), LevelError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Check the level can be built
    ///
    /// # Errors
    ///
    /// Returns [`LevelError::Invalid`] for an empty grid, a non-positive tile
    /// size, unusable suspicion limits, or a guard, patrol point, camera or
    /// player spawn outside the grid.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(LevelError::Invalid(format!(
                "grid is {}x{} tiles",
                self.grid.width, self.grid.height
            )));
        }
        if self.grid.tile_size.is_nan() || self.grid.tile_size <= 0.0 {
            return Err(LevelError::Invalid(format!(
                "tile size {} must be positive",
                self.grid.tile_size
            )));
        }

        let guard = &self.ai.guard;
        if guard.max_suspicion.is_nan() || guard.max_suspicion <= 0.0 {
            return Err(LevelError::Invalid(format!(
                "max suspicion {} must be positive",
                guard.max_suspicion
            )));
        }
        if guard.suspicious_threshold.is_nan()
            || guard.suspicious_threshold > guard.max_suspicion
        {
            return Err(LevelError::Invalid(format!(
                "suspicious threshold {} exceeds max suspicion {}",
                guard.suspicious_threshold, guard.max_suspicion
            )));
        }

        let min = self.grid.origin;
        let max = min + self.grid.extent();
        let inside = |p: Vec2| p.cmpge(min).all() && p.cmple(max).all();

        for (i, guard) in self.guards.iter().enumerate() {
            if !inside(guard.position) {
                return Err(LevelError::Invalid(format!(
                    "guard {i} spawns outside the grid at {}",
                    guard.position
                )));
            }
            if let Some(p) = guard.patrol.iter().find(|p| !inside(**p)) {
                return Err(LevelError::Invalid(format!(
                    "guard {i} patrol point {p} is outside the grid"
                )));
            }
        }
        if let Some((i, camera)) = self
            .cameras
            .iter()
            .enumerate()
            .find(|(_, c)| !inside(c.position))
        {
            return Err(LevelError::Invalid(format!(
                "camera {i} is outside the grid at {}",
                camera.position
            )));
        }
        if !inside(self.player_spawn) {
            return Err(LevelError::Invalid(format!(
                "player spawn {} is outside the grid",
                self.player_spawn
            )));
        }
        Ok(())
    }

    /// Build the navigation grid: walls are obstacles, door tiles are
    /// walkable in the graph and flagged as obstacles while closed
    #[must_use]
    pub fn build_nav_grid(&self) -> NavGrid {
        let mut grid = NavGrid::build(self.grid, &self.walls);
        for door in self.doors.iter().filter(|d| d.closed) {
            grid.mark_region(&door.rect, true);
        }
        grid
    }
}
