//! Tile graph over the walkable area of a level
//!
//! The grid is built once from static geometry. Adjacency is generated at
//! build time; afterwards `is_obstacle` acts purely as a traversal filter so
//! doors can be closed and reopened without touching the edge lists.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Integer tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: usize,
    pub y: usize,
}

impl TileCoord {
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Neighbourhood used when generating edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Orthogonal neighbours only
    Four,
    /// Orthogonal and diagonal neighbours
    #[default]
    Eight,
}

/// Axis-aligned world-space rectangle (wall footprint, door, ...)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl ObstacleRect {
    #[must_use]
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Rectangle covering exactly the given tiles of a grid
    #[must_use]
    pub fn from_tiles(spec: &GridSpec, from: TileCoord, to: TileCoord) -> Self {
        let min = spec.origin + Vec2::new(from.x as f32, from.y as f32) * spec.tile_size;
        let max = spec.origin + Vec2::new((to.x + 1) as f32, (to.y + 1) as f32) * spec.tile_size;
        Self::new(min, max)
    }

    /// Strict overlap: touching edges do not count
    fn overlaps(&self, min: Vec2, max: Vec2) -> bool {
        self.min.x < max.x && self.max.x > min.x && self.min.y < max.y && self.max.y > min.y
    }
}

/// Grid dimensions and placement in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Width in tiles
    pub width: usize,
    /// Height in tiles
    pub height: usize,
    /// Tile edge length in world units
    pub tile_size: f32,
    /// World position of the grid's minimum corner
    pub origin: Vec2,
    #[serde(default)]
    pub connectivity: Connectivity,
}

impl GridSpec {
    #[must_use]
    pub fn new(width: usize, height: usize, tile_size: f32) -> Self {
        Self {
            width,
            height,
            tile_size,
            origin: Vec2::ZERO,
            connectivity: Connectivity::Eight,
        }
    }

    #[must_use]
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    /// World-space size of the whole grid
    #[must_use]
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32) * self.tile_size
    }
}

/// Directed edge between two tiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// Index of the source tile
    pub from: usize,
    /// Index of the destination tile
    pub to: usize,
    /// Euclidean distance between tile centres, in tiles
    pub cost: f32,
}

impl Edge {
    fn is_diagonal(&self, width: usize) -> bool {
        self.from % width != self.to % width && self.from / width != self.to / width
    }
}

/// A single grid cell
#[derive(Debug, Clone)]
pub struct Tile {
    pub coord: TileCoord,
    pub is_obstacle: bool,
    edges: SmallVec<[Edge; 8]>,
}

impl Tile {
    /// Outgoing edges generated at build time
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

/// Uniform navigation grid
#[derive(Debug, Clone)]
pub struct NavGrid {
    spec: GridSpec,
    tiles: Vec<Tile>,
}

const ORTHOGONAL: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const DIAGONAL: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

impl NavGrid {
    /// Create a grid with no obstacles
    #[must_use]
    pub fn new(spec: GridSpec) -> Self {
        Self::build(spec, &[])
    }

    /// Allocate all tiles, mark every tile overlapping an obstacle region and
    /// generate adjacency.
    #[must_use]
    pub fn build(spec: GridSpec, obstacles: &[ObstacleRect]) -> Self {
        let mut tiles = Vec::with_capacity(spec.width * spec.height);
        for y in 0..spec.height {
            for x in 0..spec.width {
                tiles.push(Tile {
                    coord: TileCoord::new(x, y),
                    is_obstacle: false,
                    edges: SmallVec::new(),
                });
            }
        }

        let mut grid = Self { spec, tiles };
        for rect in obstacles {
            grid.mark_region(rect, true);
        }
        grid.rebuild_edges();

        log::debug!(
            "Built nav grid {}x{} ({} obstacle tiles)",
            spec.width,
            spec.height,
            grid.tiles.iter().filter(|t| t.is_obstacle).count()
        );
        grid
    }

    #[must_use]
    pub fn spec(&self) -> &GridSpec {
        &self.spec
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.spec.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.spec.height
    }

    #[must_use]
    pub fn tile_size(&self) -> f32 {
        self.spec.tile_size
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn index(&self, coord: TileCoord) -> Option<usize> {
        (coord.x < self.spec.width && coord.y < self.spec.height)
            .then(|| coord.y * self.spec.width + coord.x)
    }

    #[must_use]
    pub fn tile(&self, coord: TileCoord) -> Option<&Tile> {
        self.index(coord).map(|i| &self.tiles[i])
    }

    #[must_use]
    pub fn tile_at(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    /// Out-of-bounds coordinates count as obstacles
    #[must_use]
    pub fn is_obstacle(&self, coord: TileCoord) -> bool {
        self.tile(coord).is_none_or(|t| t.is_obstacle)
    }

    fn is_blocked_signed(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 {
            return true;
        }
        self.is_obstacle(TileCoord::new(x as usize, y as usize))
    }

    /// Toggle passability at runtime. Edges are left untouched; traversal
    /// filters on the flag instead.
    pub fn set_obstacle(&mut self, coord: TileCoord, obstacle: bool) {
        if let Some(i) = self.index(coord) {
            self.tiles[i].is_obstacle = obstacle;
        }
    }

    /// Set the flag on every tile overlapping `rect`
    pub fn mark_region(&mut self, rect: &ObstacleRect, obstacle: bool) {
        for coord in self.tiles_in_rect(rect) {
            self.set_obstacle(coord, obstacle);
        }
    }

    /// Tiles overlapping a world-space rectangle
    #[must_use]
    pub fn tiles_in_rect(&self, rect: &ObstacleRect) -> Vec<TileCoord> {
        let size = self.spec.tile_size;
        self.tiles
            .iter()
            .filter(|t| {
                let min = self.spec.origin + Vec2::new(t.coord.x as f32, t.coord.y as f32) * size;
                rect.overlaps(min, min + Vec2::splat(size))
            })
            .map(|t| t.coord)
            .collect()
    }

    /// Recompute adjacency for the whole grid from the current obstacle
    /// flags.
    pub fn rebuild_edges(&mut self) {
        for i in 0..self.tiles.len() {
            let edges = self.edges_for(i);
            self.tiles[i].edges = edges;
        }
    }

    fn edges_for(&self, from: usize) -> SmallVec<[Edge; 8]> {
        let mut edges = SmallVec::new();
        let tile = &self.tiles[from];
        if tile.is_obstacle {
            return edges;
        }

        let (x, y) = (tile.coord.x as i64, tile.coord.y as i64);
        for &(dx, dy) in &ORTHOGONAL {
            let (nx, ny) = (x + dx as i64, y + dy as i64);
            if !self.is_blocked_signed(nx, ny) {
                edges.push(Edge {
                    from,
                    to: ny as usize * self.spec.width + nx as usize,
                    cost: 1.0,
                });
            }
        }

        if self.spec.connectivity == Connectivity::Eight {
            for &(dx, dy) in &DIAGONAL {
                let (nx, ny) = (x + dx as i64, y + dy as i64);
                if self.is_blocked_signed(nx, ny) || self.cuts_corner(x, y, nx, ny) {
                    continue;
                }
                edges.push(Edge {
                    from,
                    to: ny as usize * self.spec.width + nx as usize,
                    cost: std::f32::consts::SQRT_2,
                });
            }
        }

        edges
    }

    /// A diagonal step is a corner cut when either orthogonal corner tile is
    /// blocked.
    fn cuts_corner(&self, x: i64, y: i64, nx: i64, ny: i64) -> bool {
        self.is_blocked_signed(nx, y) || self.is_blocked_signed(x, ny)
    }

    /// Edges that can be traversed with the current obstacle flags
    pub fn passable_edges(&self, from: usize) -> impl Iterator<Item = &Edge> + '_ {
        let width = self.spec.width;
        self.tiles[from]
            .edges
            .iter()
            .filter(move |e| !self.tiles[e.to].is_obstacle)
            .filter(move |e| {
                if !e.is_diagonal(width) {
                    return true;
                }
                let (fx, fy) = ((e.from % width) as i64, (e.from / width) as i64);
                let (tx, ty) = ((e.to % width) as i64, (e.to / width) as i64);
                !self.cuts_corner(fx, fy, tx, ty)
            })
    }

    /// World point to tile, clamped to the grid bounds
    #[must_use]
    pub fn world_to_tile(&self, pos: Vec2) -> TileCoord {
        let local = (pos - self.spec.origin) / self.spec.tile_size;
        let max_x = self.spec.width.saturating_sub(1) as f32;
        let max_y = self.spec.height.saturating_sub(1) as f32;
        TileCoord::new(
            local.x.floor().clamp(0.0, max_x) as usize,
            local.y.floor().clamp(0.0, max_y) as usize,
        )
    }

    /// Centre of a tile in world space
    #[must_use]
    pub fn tile_to_world(&self, coord: TileCoord) -> Vec2 {
        self.spec.origin
            + Vec2::new(coord.x as f32 + 0.5, coord.y as f32 + 0.5) * self.spec.tile_size
    }

    /// Whether a world point lies inside the grid bounds
    #[must_use]
    pub fn contains(&self, pos: Vec2) -> bool {
        let local = pos - self.spec.origin;
        let extent = self.spec.extent();
        local.x >= 0.0 && local.y >= 0.0 && local.x < extent.x && local.y < extent.y
    }

    /// Nearest non-obstacle tile to a world point.
    ///
    /// Linear scan over every tile; fine for level-sized grids but this is
    /// the hot spot when endpoints land inside walls.
    #[must_use]
    pub fn nearest_walkable(&self, pos: Vec2) -> Option<TileCoord> {
        let mut best: Option<(f32, TileCoord)> = None;
        for tile in self.tiles.iter().filter(|t| !t.is_obstacle) {
            let d = self.tile_to_world(tile.coord).distance_squared(pos);
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, tile.coord));
            }
        }
        best.map(|(_, coord)| coord)
    }

    /// Exact grid traversal between two world points. A segment passing
    /// precisely through a tile corner is blocked if either side tile is.
    #[must_use]
    pub fn is_line_clear(&self, from: Vec2, to: Vec2) -> bool {
        let a = (from - self.spec.origin) / self.spec.tile_size;
        let b = (to - self.spec.origin) / self.spec.tile_size;
        let d = b - a;

        let mut x = a.x.floor() as i64;
        let mut y = a.y.floor() as i64;
        let end_x = b.x.floor() as i64;
        let end_y = b.y.floor() as i64;

        let step_x: i64 = if d.x > 0.0 { 1 } else if d.x < 0.0 { -1 } else { 0 };
        let step_y: i64 = if d.y > 0.0 { 1 } else if d.y < 0.0 { -1 } else { 0 };

        let t_delta_x = if d.x != 0.0 { 1.0 / d.x.abs() } else { f32::INFINITY };
        let t_delta_y = if d.y != 0.0 { 1.0 / d.y.abs() } else { f32::INFINITY };
        let mut t_max_x = match step_x {
            1 => ((x + 1) as f32 - a.x) * t_delta_x,
            -1 => (a.x - x as f32) * t_delta_x,
            _ => f32::INFINITY,
        };
        let mut t_max_y = match step_y {
            1 => ((y + 1) as f32 - a.y) * t_delta_y,
            -1 => (a.y - y as f32) * t_delta_y,
            _ => f32::INFINITY,
        };

        let steps = (end_x - x).abs() + (end_y - y).abs();
        for _ in 0..steps {
            if self.is_blocked_signed(x, y) {
                return false;
            }
            if x == end_x && y == end_y {
                return true;
            }
            if (t_max_x - t_max_y).abs() < 1e-5 {
                if self.is_blocked_signed(x + step_x, y) || self.is_blocked_signed(x, y + step_y) {
                    return false;
                }
                x += step_x;
                y += step_y;
                t_max_x += t_delta_x;
                t_max_y += t_delta_y;
            } else if t_max_x < t_max_y {
                x += step_x;
                t_max_x += t_delta_x;
            } else {
                y += step_y;
                t_max_y += t_delta_y;
            }
        }
        !self.is_blocked_signed(x, y)
    }
}
