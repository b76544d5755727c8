//! A* pathfinding over the tile graph
//!
//! Endpoints are clamped to the grid and snapped off obstacle tiles before
//! the search, so a returned path never contains an obstacle tile.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec2;
use rustc_hash::FxHashMap;

use super::grid::{NavGrid, TileCoord};

/// Result of pathfinding
#[derive(Debug, Clone, Default)]
pub struct PathResult {
    /// Tiles from start to goal, inclusive
    pub tiles: Vec<TileCoord>,
    /// Tile centres in world coordinates
    pub waypoints: Vec<Vec2>,
    /// Total path length in world units
    pub length: f32,
}

impl PathResult {
    /// Check if path was found
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }
}

/// A* node for priority queue
#[derive(Debug, Clone, Copy)]
struct Node {
    index: usize,
    g_cost: f32, // Cost from start
    f_cost: f32, // g_cost + heuristic
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap. Ties prefer the deeper node, then the lower
        // tile index, so results are reproducible.
        other
            .f_cost
            .total_cmp(&self.f_cost)
            .then_with(|| self.g_cost.total_cmp(&other.g_cost))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Resolve a world point to a walkable tile: clamp to bounds, then snap to
/// the nearest non-obstacle tile when needed.
fn resolve_endpoint(grid: &NavGrid, pos: Vec2) -> Option<TileCoord> {
    let coord = grid.world_to_tile(pos);
    if grid.is_obstacle(coord) {
        grid.nearest_walkable(pos)
    } else {
        Some(coord)
    }
}

/// Find a path using A* algorithm.
///
/// Returns an empty result when the endpoints lie in disconnected regions;
/// callers fall back to moving directly toward the goal.
#[must_use]
pub fn find_path(grid: &NavGrid, start: Vec2, goal: Vec2) -> PathResult {
    let (Some(start), Some(goal)) = (resolve_endpoint(grid, start), resolve_endpoint(grid, goal))
    else {
        return PathResult::default();
    };

    let (Some(start_index), Some(goal_index)) = (grid.index(start), grid.index(goal)) else {
        return PathResult::default();
    };

    let mut open_set = BinaryHeap::new();
    let mut came_from: FxHashMap<usize, usize> = FxHashMap::default();
    let mut g_score: FxHashMap<usize, f32> = FxHashMap::default();

    // Euclidean distance in tile units, admissible for both 4 and 8 connectivity
    let heuristic = |index: usize| -> f32 {
        let dx = (index % grid.width()) as f32 - goal.x as f32;
        let dy = (index / grid.width()) as f32 - goal.y as f32;
        (dx * dx + dy * dy).sqrt()
    };

    g_score.insert(start_index, 0.0);
    open_set.push(Node {
        index: start_index,
        g_cost: 0.0,
        f_cost: heuristic(start_index),
    });

    while let Some(current) = open_set.pop() {
        if current.index == goal_index {
            return reconstruct(grid, &came_from, goal_index);
        }

        // Stale heap entry
        if current.g_cost > *g_score.get(&current.index).unwrap_or(&f32::MAX) {
            continue;
        }

        for edge in grid.passable_edges(current.index) {
            let tentative_g = current.g_cost + edge.cost;

            if tentative_g < *g_score.get(&edge.to).unwrap_or(&f32::MAX) {
                came_from.insert(edge.to, current.index);
                g_score.insert(edge.to, tentative_g);

                open_set.push(Node {
                    index: edge.to,
                    g_cost: tentative_g,
                    f_cost: tentative_g + heuristic(edge.to),
                });
            }
        }
    }

    log::trace!("No path from {start:?} to {goal:?}");
    PathResult::default()
}

fn reconstruct(grid: &NavGrid, came_from: &FxHashMap<usize, usize>, goal: usize) -> PathResult {
    let mut indices = vec![goal];
    let mut curr = goal;
    while let Some(&prev) = came_from.get(&curr) {
        indices.push(prev);
        curr = prev;
    }
    indices.reverse();

    let tiles: Vec<TileCoord> = indices
        .iter()
        .filter_map(|&i| grid.tile_at(i).map(|t| t.coord))
        .collect();
    let waypoints: Vec<Vec2> = tiles.iter().map(|&c| grid.tile_to_world(c)).collect();
    let length = calculate_path_length(&waypoints);

    PathResult {
        tiles,
        waypoints,
        length,
    }
}

/// Calculate total path length
fn calculate_path_length(waypoints: &[Vec2]) -> f32 {
    waypoints.windows(2).map(|w| w[0].distance(w[1])).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::grid::{Connectivity, GridSpec, ObstacleRect};

    fn wall(spec: &GridSpec, from: (usize, usize), to: (usize, usize)) -> ObstacleRect {
        ObstacleRect::from_tiles(spec, TileCoord::new(from.0, from.1), TileCoord::new(to.0, to.1))
    }

    #[test]
    fn test_grid_pathfinding() {
        let spec = GridSpec::new(10, 10, 1.0);
        let grid = NavGrid::build(spec, &[wall(&spec, (5, 2), (5, 7))]);

        let path = find_path(&grid, Vec2::new(2.5, 5.5), Vec2::new(8.5, 5.5));

        assert!(!path.is_empty());
        assert!(path.waypoints.len() > 2); // Should go around the wall
        assert!(path.tiles.iter().all(|&t| !grid.is_obstacle(t)));
        assert_eq!(path.tiles.first(), Some(&TileCoord::new(2, 5)));
        assert_eq!(path.tiles.last(), Some(&TileCoord::new(8, 5)));
    }

    #[test]
    fn test_direct_path() {
        let grid = NavGrid::new(GridSpec::new(10, 10, 1.0));

        let path = find_path(&grid, Vec2::new(0.5, 0.5), Vec2::new(3.5, 0.5));

        assert!(!path.is_empty());
        assert_eq!(path.waypoints.len(), 4); // 4 cells in a line
        assert!((path.length - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_diagonal_path_uses_sqrt2() {
        let grid = NavGrid::new(GridSpec::new(5, 5, 1.0));

        let path = find_path(&grid, Vec2::new(0.5, 0.5), Vec2::new(3.5, 3.5));

        assert_eq!(path.len(), 4);
        assert!((path.length - 3.0 * std::f32::consts::SQRT_2).abs() < 1e-4);
    }

    #[test]
    fn test_four_connected_path() {
        let grid = NavGrid::new(GridSpec::new(5, 5, 1.0).with_connectivity(Connectivity::Four));

        let path = find_path(&grid, Vec2::new(0.5, 0.5), Vec2::new(3.5, 3.5));

        assert_eq!(path.len(), 7);
    }

    #[test]
    fn test_no_path() {
        let spec = GridSpec::new(5, 5, 1.0);
        // Box in the goal
        let walls = [
            wall(&spec, (3, 2), (3, 2)),
            wall(&spec, (3, 4), (3, 4)),
            wall(&spec, (2, 3), (2, 3)),
            wall(&spec, (4, 3), (4, 3)),
        ];
        let grid = NavGrid::build(spec, &walls);

        let path = find_path(&grid, Vec2::new(0.5, 0.5), Vec2::new(3.5, 3.5));

        assert!(path.is_empty());
    }

    #[test]
    fn test_obstacle_endpoints_are_snapped() {
        let spec = GridSpec::new(6, 3, 1.0);
        let grid = NavGrid::build(spec, &[wall(&spec, (5, 0), (5, 2))]);

        let path = find_path(&grid, Vec2::new(0.5, 1.5), Vec2::new(5.5, 1.5));

        assert_eq!(path.tiles.last(), Some(&TileCoord::new(4, 1)));
        assert!(path.tiles.iter().all(|&t| !grid.is_obstacle(t)));
    }

    #[test]
    fn test_out_of_bounds_is_clamped() {
        let grid = NavGrid::new(GridSpec::new(4, 4, 1.0));

        let path = find_path(&grid, Vec2::new(-10.0, -10.0), Vec2::new(100.0, 0.5));

        assert_eq!(path.tiles.first(), Some(&TileCoord::new(0, 0)));
        assert_eq!(path.tiles.last(), Some(&TileCoord::new(3, 0)));
    }

    #[test]
    fn test_path_never_crosses_obstacles() {
        let spec = GridSpec::new(12, 12, 1.0);
        let walls = [
            wall(&spec, (3, 0), (3, 9)),
            wall(&spec, (7, 2), (7, 11)),
            wall(&spec, (9, 5), (11, 5)),
        ];
        let grid = NavGrid::build(spec, &walls);

        for (start, goal) in [
            (Vec2::new(0.5, 0.5), Vec2::new(11.5, 11.5)),
            (Vec2::new(11.5, 0.5), Vec2::new(0.5, 11.5)),
            (Vec2::new(5.5, 5.5), Vec2::new(10.5, 6.5)),
        ] {
            let path = find_path(&grid, start, goal);
            assert!(!path.is_empty());
            assert!(path.tiles.iter().all(|&t| !grid.is_obstacle(t)));
        }
    }

    #[test]
    fn test_closed_door_reroutes() {
        let spec = GridSpec::new(5, 3, 1.0);
        // Wall across the middle column with a single gap at (2,1)
        let walls = [wall(&spec, (2, 0), (2, 0)), wall(&spec, (2, 2), (2, 2))];
        let mut grid = NavGrid::build(spec, &walls);

        assert!(!find_path(&grid, Vec2::new(0.5, 1.5), Vec2::new(4.5, 1.5)).is_empty());

        grid.set_obstacle(TileCoord::new(2, 1), true);
        assert!(find_path(&grid, Vec2::new(0.5, 1.5), Vec2::new(4.5, 1.5)).is_empty());

        grid.set_obstacle(TileCoord::new(2, 1), false);
        assert!(!find_path(&grid, Vec2::new(0.5, 1.5), Vec2::new(4.5, 1.5)).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let spec = GridSpec::new(8, 8, 1.0);
        let grid = NavGrid::build(spec, &[wall(&spec, (4, 1), (4, 6))]);

        let first = find_path(&grid, Vec2::new(0.5, 3.5), Vec2::new(7.5, 4.5));
        for _ in 0..5 {
            let again = find_path(&grid, Vec2::new(0.5, 3.5), Vec2::new(7.5, 4.5));
            assert_eq!(first.tiles, again.tiles);
        }
    }
}
