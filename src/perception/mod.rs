//! Perception module
//!
//! Vision cones and line-of-sight queries against a read-only physics view.

mod cone;
mod service;
mod sight;
mod world;

pub use cone::{MAX_CONE_RAYS, VisionCone};
pub use service::{PerceptionService, Sighting};
pub use sight::has_line_of_sight;
pub use world::{BodyId, GROUP_ACTOR, GROUP_STATIC, PhysicsQuery, RayFilter, RayHit};

#[cfg(test)]
pub(crate) use world::testing;
