//! Read-only view of the physics world used by perception queries

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Collision group of static level geometry (walls, closed doors)
pub const GROUP_STATIC: u32 = 1 << 0;
/// Collision group of moving actors (guards, the player)
pub const GROUP_ACTOR: u32 = 1 << 1;

/// Stable identifier of a physics body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId {
    pub index: u32,
    pub generation: u32,
}

impl BodyId {
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// Which fixtures a ray may stop at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayFilter {
    /// Body whose own fixtures are ignored (the caster)
    pub exclude_body: Option<BodyId>,
    /// Collision group bits the ray is allowed to hit
    pub mask: u32,
}

impl RayFilter {
    /// Hit every group, exclude nothing
    pub const ALL: Self = Self {
        exclude_body: None,
        mask: u32::MAX,
    };

    #[must_use]
    pub fn excluding(body: BodyId) -> Self {
        Self {
            exclude_body: Some(body),
            ..Self::ALL
        }
    }

    #[must_use]
    pub fn with_mask(mut self, mask: u32) -> Self {
        self.mask = mask;
        self
    }
}

impl Default for RayFilter {
    fn default() -> Self {
        Self::ALL
    }
}

/// Nearest blocking fixture along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Hit fraction along the segment, in `[0, 1]`
    pub fraction: f32,
    /// World-space hit point
    pub point: Vec2,
    /// Body owning the hit fixture, if any
    pub body: Option<BodyId>,
}

/// Physics service consumed by perception.
///
/// Implementations must skip sensor fixtures and the filter's excluded body,
/// and report only the nearest hit on the segment `origin..end`.
pub trait PhysicsQuery {
    fn raycast(&self, origin: Vec2, end: Vec2, filter: &RayFilter) -> Option<RayHit>;

    fn body_position(&self, body: BodyId) -> Option<Vec2>;

    /// World rotation in radians, counter-clockwise from +X
    fn body_angle(&self, body: BodyId) -> Option<f32>;
}

impl<T: PhysicsQuery + ?Sized> PhysicsQuery for &T {
    fn raycast(&self, origin: Vec2, end: Vec2, filter: &RayFilter) -> Option<RayHit> {
        (**self).raycast(origin, end, filter)
    }

    fn body_position(&self, body: BodyId) -> Option<Vec2> {
        (**self).body_position(body)
    }

    fn body_angle(&self, body: BodyId) -> Option<f32> {
        (**self).body_angle(body)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::BoxWorld;
    use super::*;

    #[test]
    fn test_box_world_nearest_hit() {
        let world = BoxWorld::new()
            .wall(Vec2::new(2.0, -1.0), Vec2::new(3.0, 1.0))
            .wall(Vec2::new(5.0, -1.0), Vec2::new(6.0, 1.0));

        let hit = world
            .raycast(Vec2::ZERO, Vec2::new(10.0, 0.0), &RayFilter::ALL)
            .unwrap();

        assert!((hit.fraction - 0.2).abs() < 1e-5);
        assert!((hit.point - Vec2::new(2.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_box_world_skips_sensors_and_self() {
        let me = BodyId::new(1, 0);
        let world = BoxWorld::new()
            .sensor(Vec2::new(2.0, -1.0), Vec2::new(3.0, 1.0))
            .body(me, Vec2::ZERO, 0.0, 0.5);

        assert!(world
            .raycast(Vec2::ZERO, Vec2::new(10.0, 0.0), &RayFilter::excluding(me))
            .is_none());
        assert!(world
            .raycast(Vec2::ZERO, Vec2::new(10.0, 0.0), &RayFilter::ALL)
            .is_some());
    }

    #[test]
    fn test_mask_filters_groups() {
        let other = BodyId::new(2, 0);
        let world = BoxWorld::new().body(other, Vec2::new(4.0, 0.0), 0.0, 0.5);

        let walls_only = RayFilter::ALL.with_mask(GROUP_STATIC);
        assert!(world
            .raycast(Vec2::ZERO, Vec2::new(10.0, 0.0), &walls_only)
            .is_none());
    }
}
