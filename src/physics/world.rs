//! Top-down physics world using rapier3d
//!
//! Everything lives in the z = 0 plane. Bodies may only translate along x
//! and y and rotate about z, so a body's yaw is its facing angle.

use glam::Vec2;
use rapier3d::na;
use rapier3d::prelude::*;

use crate::perception::{BodyId, GROUP_ACTOR, GROUP_STATIC, PhysicsQuery, RayFilter, RayHit};

/// Half thickness of every collider along z
const SLAB_HALF_DEPTH: f32 = 0.5;

/// Handle to a static collider (wall, door or sensor volume)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub rapier3d::geometry::ColliderHandle);

fn to_body_id(handle: RigidBodyHandle) -> BodyId {
    let (index, generation) = handle.into_raw_parts();
    BodyId::new(index, generation)
}

fn to_handle(id: BodyId) -> RigidBodyHandle {
    RigidBodyHandle::from_raw_parts(id.index, id.generation)
}

fn yaw_rotation(angle: f32) -> Rotation<Real> {
    na::UnitQuaternion::from_euler_angles(0.0, 0.0, angle)
}

fn groups(membership: u32) -> InteractionGroups {
    InteractionGroups::new(Group::from_bits_truncate(membership), Group::ALL)
}

/// Physics world manager
pub struct Physics {
    /// Physics pipeline
    pipeline: PhysicsPipeline,
    /// Island manager
    island_manager: IslandManager,
    /// Broad phase
    broad_phase: DefaultBroadPhase,
    /// Narrow phase
    narrow_phase: NarrowPhase,
    /// Rigid body set
    rigid_body_set: RigidBodySet,
    /// Collider set
    collider_set: ColliderSet,
    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,
    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,
    /// CCD solver
    ccd_solver: CCDSolver,
    /// Query pipeline for perception raycasts
    query_pipeline: QueryPipeline,
    /// Integration parameters
    integration_parameters: IntegrationParameters,
}

impl Physics {
    /// Create an empty world with no gravity
    pub fn new() -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
        }
    }

    /// Step the simulation. Also refreshes the query pipeline, so the AI
    /// tick that follows sees the advanced world.
    pub fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;

        self.pipeline.step(
            &vector![0.0, 0.0, 0.0],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }

    /// Rebuild the raycast acceleration structure without stepping.
    ///
    /// Needed after adding colliders or teleporting bodies before the first
    /// `step`.
    pub fn update_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a solid axis-aligned wall block
    pub fn add_wall(&mut self, min: Vec2, max: Vec2) -> ColliderHandle {
        self.add_static_box(min, max, false)
    }

    /// Add a sensor volume. Sensors never block sight.
    pub fn add_sensor(&mut self, min: Vec2, max: Vec2) -> ColliderHandle {
        self.add_static_box(min, max, true)
    }

    fn add_static_box(&mut self, min: Vec2, max: Vec2, sensor: bool) -> ColliderHandle {
        let half = ((max - min) * 0.5).abs();
        let centre = (min + max) * 0.5;
        let collider = ColliderBuilder::cuboid(half.x, half.y, SLAB_HALF_DEPTH)
            .translation(vector![centre.x, centre.y, 0.0])
            .collision_groups(groups(GROUP_STATIC))
            .sensor(sensor)
            .build();

        ColliderHandle(self.collider_set.insert(collider))
    }

    /// Open (`false`) or close (`true`) a door collider.
    ///
    /// An open door stays in the world as a sensor so nothing collides with
    /// it or stops at it. Returns `false` if the collider no longer exists.
    pub fn set_wall_solid(&mut self, wall: ColliderHandle, solid: bool) -> bool {
        match self.collider_set.get_mut(wall.0) {
            Some(collider) => {
                collider.set_sensor(!solid);
                true
            }
            None => false,
        }
    }

    /// Create a dynamic actor (guard or player) with a round footprint
    pub fn create_actor(&mut self, position: Vec2, angle: f32, radius: f32) -> BodyId {
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![position.x, position.y, 0.0])
            .rotation(vector![0.0, 0.0, angle])
            .enabled_translations(true, true, false)
            .enabled_rotations(false, false, true)
            .linear_damping(4.0)
            .build();
        let handle = self.rigid_body_set.insert(body);

        let collider = ColliderBuilder::ball(radius)
            .collision_groups(groups(GROUP_ACTOR))
            .density(1.0)
            .build();
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);

        to_body_id(handle)
    }

    /// Create a fixed body with no collider (wall-mounted camera)
    pub fn create_fixture(&mut self, position: Vec2, angle: f32) -> BodyId {
        let body = RigidBodyBuilder::fixed()
            .translation(vector![position.x, position.y, 0.0])
            .rotation(vector![0.0, 0.0, angle])
            .build();

        to_body_id(self.rigid_body_set.insert(body))
    }

    /// Teleport a body
    pub fn set_pose(&mut self, body: BodyId, position: Vec2, angle: f32) {
        if let Some(rb) = self.rigid_body_set.get_mut(to_handle(body)) {
            rb.set_translation(vector![position.x, position.y, 0.0], true);
            rb.set_rotation(yaw_rotation(angle), true);
        }
    }

    /// Set a body's planar velocity and facing
    pub fn drive(&mut self, body: BodyId, velocity: Vec2, facing: f32) {
        if let Some(rb) = self.rigid_body_set.get_mut(to_handle(body)) {
            rb.set_linvel(vector![velocity.x, velocity.y, 0.0], true);
            rb.set_angvel(vector![0.0, 0.0, 0.0], true);
            rb.set_rotation(yaw_rotation(facing), true);
        }
    }

    /// Planar velocity of a body
    pub fn velocity(&self, body: BodyId) -> Option<Vec2> {
        self.rigid_body_set.get(to_handle(body)).map(|rb| {
            let vel = rb.linvel();
            Vec2::new(vel.x, vel.y)
        })
    }

    /// Remove a body and its colliders
    pub fn remove_body(&mut self, body: BodyId) {
        self.rigid_body_set.remove(
            to_handle(body),
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    pub fn collider_count(&self) -> usize {
        self.collider_set.len()
    }
}

impl Default for Physics {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsQuery for Physics {
    fn raycast(&self, origin: Vec2, end: Vec2, filter: &RayFilter) -> Option<RayHit> {
        let delta = end - origin;
        if delta.length_squared() <= f32::EPSILON {
            return None;
        }

        // Direction is the whole segment, so time of impact is the fraction
        let ray = Ray::new(
            point![origin.x, origin.y, 0.0],
            vector![delta.x, delta.y, 0.0],
        );
        let ray_groups = InteractionGroups::new(Group::ALL, Group::from_bits_truncate(filter.mask));
        let mut query = QueryFilter::default().exclude_sensors().groups(ray_groups);
        if let Some(body) = filter.exclude_body {
            query = query.exclude_rigid_body(to_handle(body));
        }

        self.query_pipeline
            .cast_ray(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                1.0,
                true,
                query,
            )
            .map(|(handle, toi)| {
                let point = ray.point_at(toi);
                RayHit {
                    fraction: toi,
                    point: Vec2::new(point.x, point.y),
                    body: self
                        .collider_set
                        .get(handle)
                        .and_then(|c| c.parent())
                        .map(to_body_id),
                }
            })
    }

    fn body_position(&self, body: BodyId) -> Option<Vec2> {
        self.rigid_body_set.get(to_handle(body)).map(|rb| {
            let pos = rb.translation();
            Vec2::new(pos.x, pos.y)
        })
    }

    fn body_angle(&self, body: BodyId) -> Option<f32> {
        self.rigid_body_set
            .get(to_handle(body))
            .map(|rb| rb.rotation().euler_angles().2)
    }
}
