//! Perception queries used by the AI each tick

use glam::Vec2;

use super::cone::VisionCone;
use super::sight::has_line_of_sight;
use super::world::{BodyId, PhysicsQuery, RayFilter};
use crate::core::SightConfig;

/// A confirmed sighting of a target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sighting {
    /// Target's world position this tick
    pub position: Vec2,
    /// Distance from the observer
    pub distance: f32,
}

/// Cone and line-of-sight tests against a physics world.
///
/// All queries are read-only; a missing body is reported as "not visible".
#[derive(Debug, Clone, Default)]
pub struct PerceptionService {
    pub sight: SightConfig,
}

impl PerceptionService {
    #[must_use]
    pub fn new(sight: SightConfig) -> Self {
        Self { sight }
    }

    /// Whether `point` lies in the cone's current polygon
    #[must_use]
    pub fn in_cone(&self, cone: &VisionCone, point: Vec2) -> bool {
        cone.contains(point)
    }

    /// Multi-ray line of sight, ignoring the caster's own fixtures and
    /// treating hits on `target` as visible
    #[must_use]
    pub fn has_line_of_sight(
        &self,
        world: &impl PhysicsQuery,
        start: Vec2,
        end: Vec2,
        caster: Option<BodyId>,
        target: Option<BodyId>,
    ) -> bool {
        let filter = RayFilter {
            exclude_body: caster,
            mask: self.sight.filter_mask,
        };
        has_line_of_sight(world, start, end, &self.sight, &filter, target)
    }

    /// Cone test followed by line of sight from the cone's apex.
    ///
    /// Expects `cone.update` to have run this tick.
    #[must_use]
    pub fn observe(
        &self,
        world: &impl PhysicsQuery,
        cone: &VisionCone,
        target: BodyId,
    ) -> Option<Sighting> {
        let position = world.body_position(target)?;
        if !self.in_cone(cone, position) {
            return None;
        }
        let origin = cone.origin();
        self.has_line_of_sight(world, origin, position, Some(cone.body()), Some(target))
            .then(|| Sighting {
                position,
                distance: origin.distance(position),
            })
    }
}
