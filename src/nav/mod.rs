//! Navigation module
//!
//! Tile graph construction, A* pathfinding and string-pull smoothing.

mod astar;
mod grid;
mod planner;
mod smoothing;

pub use astar::{PathResult, find_path};
pub use grid::{Connectivity, Edge, GridSpec, NavGrid, ObstacleRect, Tile, TileCoord};
pub use planner::{GridPlanner, PathPlanner};
pub use smoothing::smooth_path;
