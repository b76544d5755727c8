//! String-pulling path smoother
//!
//! Reduces a dense tile path to the waypoints where the walker actually has
//! to turn. Visibility is delegated to a caller supplied line-of-sight test,
//! so the same smoother works against the grid or the physics world.

use glam::Vec2;

/// Smooth a path by iterative line-of-sight shortcutting.
///
/// From each anchor the furthest later point visible from it becomes the next
/// anchor. The first and last points are always kept, the result is never
/// longer than the input, and paths of two points or fewer are returned as
/// they are. Consecutive input points are assumed mutually visible.
#[must_use]
pub fn smooth_path<F>(path: &[Vec2], mut line_of_sight: F) -> Vec<Vec2>
where
    F: FnMut(Vec2, Vec2) -> bool,
{
    if path.len() <= 2 {
        return path.to_vec();
    }

    let last = path.len() - 1;
    let mut smoothed = vec![path[0]];
    let mut anchor = 0;

    while anchor < last {
        let next = (anchor + 2..=last)
            .rev()
            .find(|&i| line_of_sight(path[anchor], path[i]))
            .unwrap_or(anchor + 1);
        smoothed.push(path[next]);
        anchor = next;
    }

    smoothed
}
