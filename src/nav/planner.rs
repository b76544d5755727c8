//! Target resolution: A* path, string-pulled, reduced to the next waypoint

use glam::Vec2;

use super::astar::find_path;
use super::grid::NavGrid;
use super::smoothing::smooth_path;

/// Resolves a movement target into the next concrete waypoint.
///
/// `None` means no route exists; callers fall back to a direct vector.
pub trait PathPlanner {
    fn next_waypoint(&self, from: Vec2, to: Vec2) -> Option<Vec2>;

    /// Where a walker heading for `to` actually ends up: `to` itself, or the
    /// nearest walkable point when `to` is blocked or off the map
    fn reachable_goal(&self, to: Vec2) -> Vec2 {
        to
    }
}

/// Planner backed by a [`NavGrid`] and a line-of-sight test for smoothing
pub struct GridPlanner<'a, L> {
    grid: &'a NavGrid,
    line_of_sight: L,
}

impl<'a> GridPlanner<'a, fn(&NavGrid, Vec2, Vec2) -> bool> {
    /// Planner that smooths against the grid's own obstacle flags
    #[must_use]
    pub fn new(grid: &'a NavGrid) -> Self {
        Self {
            grid,
            line_of_sight: NavGrid::is_line_clear,
        }
    }
}

impl<'a, L> GridPlanner<'a, L>
where
    L: Fn(&NavGrid, Vec2, Vec2) -> bool,
{
    /// Planner with a custom visibility test, e.g. a physics raycast
    #[must_use]
    pub fn with_line_of_sight(grid: &'a NavGrid, line_of_sight: L) -> Self {
        Self {
            grid,
            line_of_sight,
        }
    }

    /// Full smoothed route from `from` to `to`, starting at `from` itself.
    ///
    /// The first tile centre is replaced by the actual start position and the
    /// last by the actual goal when the goal lies on a walkable tile.
    #[must_use]
    pub fn route(&self, from: Vec2, to: Vec2) -> Vec<Vec2> {
        let path = find_path(self.grid, from, to);
        if path.is_empty() {
            return Vec::new();
        }

        let mut points = path.waypoints;
        points[0] = from;
        let goal_tile = self.grid.world_to_tile(to);
        if self.grid.contains(to) && path.tiles.last() == Some(&goal_tile) && points.len() > 1 {
            let last = points.len() - 1;
            points[last] = to;
        }

        smooth_path(&points, |a, b| (self.line_of_sight)(self.grid, a, b))
    }
}

impl<L> PathPlanner for GridPlanner<'_, L>
where
    L: Fn(&NavGrid, Vec2, Vec2) -> bool,
{
    fn next_waypoint(&self, from: Vec2, to: Vec2) -> Option<Vec2> {
        let route = self.route(from, to);
        match route.len() {
            0 => None,
            // Already on the goal tile
            1 => Some(to),
            _ => Some(route[1]),
        }
    }

    fn reachable_goal(&self, to: Vec2) -> Vec2 {
        let coord = self.grid.world_to_tile(to);
        if !self.grid.is_obstacle(coord) {
            return if self.grid.contains(to) {
                to
            } else {
                self.grid.tile_to_world(coord)
            };
        }
        self.grid
            .nearest_walkable(to)
            .map_or(to, |walkable| self.grid.tile_to_world(walkable))
    }
}
