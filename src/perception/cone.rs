//! Vision cone attached to a physics body
//!
//! The cone is a triangle fan rooted at the body. Every update re-casts the
//! boundary rays and truncates each at the first blocking fixture, so the
//! cone stops at walls both visually and logically.

use arrayvec::ArrayVec;
use glam::Vec2;

use super::world::{BodyId, PhysicsQuery, RayFilter};
use crate::core::VisionConfig;

/// Upper bound on boundary rays per cone
pub const MAX_CONE_RAYS: usize = 32;

/// Apex plus one vertex per boundary ray
const CONE_CAPACITY: usize = MAX_CONE_RAYS + 1;

#[derive(Debug, Clone)]
pub struct VisionCone {
    /// Body the cone follows (not owned)
    body: BodyId,
    /// View distance
    pub radius: f32,
    /// Half of the opening angle, in radians
    pub half_angle: f32,
    /// Facing relative to the body's rotation
    pub angle_offset: f32,
    /// Collision groups that block sight
    pub filter_mask: u32,
    num_rays: usize,
    origin: Vec2,
    facing: f32,
    polygon: ArrayVec<Vec2, CONE_CAPACITY>,
}

impl VisionCone {
    #[must_use]
    pub fn new(body: BodyId, config: &VisionConfig) -> Self {
        Self {
            body,
            radius: config.radius,
            half_angle: config.half_angle,
            angle_offset: 0.0,
            filter_mask: config.filter_mask,
            num_rays: config.num_rays.clamp(2, MAX_CONE_RAYS),
            origin: Vec2::ZERO,
            facing: 0.0,
            polygon: ArrayVec::new(),
        }
    }

    #[must_use]
    pub fn with_offset(mut self, angle_offset: f32) -> Self {
        self.angle_offset = angle_offset;
        self
    }

    #[must_use]
    pub fn body(&self) -> BodyId {
        self.body
    }

    #[must_use]
    pub fn num_rays(&self) -> usize {
        self.num_rays
    }

    /// Apex of the cone as of the last update
    #[must_use]
    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// World facing angle as of the last update
    #[must_use]
    pub fn facing(&self) -> f32 {
        self.facing
    }

    /// Fan vertices: apex first, then the truncated ray ends from one edge of
    /// the cone to the other
    #[must_use]
    pub fn polygon(&self) -> &[Vec2] {
        &self.polygon
    }

    /// Rebuild the polygon from the body's current pose.
    ///
    /// Returns `false` and leaves an empty cone (nothing visible) when the
    /// body no longer exists.
    pub fn update(&mut self, world: &impl PhysicsQuery) -> bool {
        self.polygon.clear();

        let (Some(origin), Some(angle)) =
            (world.body_position(self.body), world.body_angle(self.body))
        else {
            log::debug!("Vision cone body {:?} missing, cone cleared", self.body);
            return false;
        };

        self.origin = origin;
        self.facing = angle + self.angle_offset;

        let filter = RayFilter::excluding(self.body).with_mask(self.filter_mask);
        let step = 2.0 * self.half_angle / (self.num_rays - 1) as f32;

        self.polygon.push(origin);
        for i in 0..self.num_rays {
            let ray_angle = self.facing - self.half_angle + step * i as f32;
            let end = origin + Vec2::from_angle(ray_angle) * self.radius;
            let vertex = world
                .raycast(origin, end, &filter)
                .map_or(end, |hit| hit.point);
            self.polygon.push(vertex);
        }
        true
    }

    /// Point-in-fan test against the current polygon
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        if self.polygon.len() < 3 || point.distance_squared(self.origin) > self.radius * self.radius
        {
            return false;
        }

        let apex = self.polygon[0];
        self.polygon[1..]
            .windows(2)
            .any(|edge| in_triangle(point, apex, edge[0], edge[1]))
    }
}

/// Inclusive point-in-triangle test, independent of winding
fn in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}
