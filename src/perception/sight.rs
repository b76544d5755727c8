//! Multi-ray line-of-sight query
//!
//! A single blocked ray does not mean the target is hidden: a fan of
//! alternate rays around the direct line models peripheral vision past
//! partial occluders. The ray budget is `1 + 2 * fan_rays`, plus
//! `2 * margin_samples` when a safety margin is configured.

use glam::Vec2;

use super::world::{BodyId, PhysicsQuery, RayFilter};
use crate::core::SightConfig;

/// Whether the segment is blocked by anything other than `target`
fn is_blocked(
    world: &impl PhysicsQuery,
    from: Vec2,
    to: Vec2,
    filter: &RayFilter,
    target: Option<BodyId>,
) -> bool {
    world
        .raycast(from, to, filter)
        .is_some_and(|hit| hit.body.is_none() || hit.body != target)
}

/// Check whether `start` can see `end`.
///
/// Rays are capped at `config.max_distance`; anything further is not
/// visible. Hits on the `target` body itself do not count as obstruction.
#[must_use]
pub fn has_line_of_sight(
    world: &impl PhysicsQuery,
    start: Vec2,
    end: Vec2,
    config: &SightConfig,
    filter: &RayFilter,
    target: Option<BodyId>,
) -> bool {
    let delta = end - start;
    let distance = delta.length();
    if distance > config.max_distance {
        return false;
    }
    if distance <= f32::EPSILON {
        return true;
    }

    if !is_blocked(world, start, end, filter, target) {
        return match config.margin {
            Some(margin) if margin > 0.0 => {
                margin_clear(world, start, delta, margin, config.margin_samples, filter, target)
            }
            _ => true,
        };
    }

    if config.fan_rays == 0 {
        return false;
    }
    for k in 1..=config.fan_rays {
        let angle = config.fan_spread * k as f32 / config.fan_rays as f32;
        for side in [angle, -angle] {
            let alternate = start + Vec2::from_angle(side).rotate(delta);
            if !is_blocked(world, start, alternate, filter, target) {
                return true;
            }
        }
    }
    false
}

/// Sample perpendicular rays along the segment; any hit is a graze
fn margin_clear(
    world: &impl PhysicsQuery,
    start: Vec2,
    delta: Vec2,
    margin: f32,
    samples: usize,
    filter: &RayFilter,
    target: Option<BodyId>,
) -> bool {
    let normal = delta.perp().normalize_or_zero() * margin;
    (1..=samples).all(|s| {
        let p = start + delta * (s as f32 / (samples + 1) as f32);
        !is_blocked(world, p, p + normal, filter, target)
            && !is_blocked(world, p, p - normal, filter, target)
    })
}
