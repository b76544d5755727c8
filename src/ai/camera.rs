//! Security cameras
//!
//! A camera is a fixed body carrying a vision cone that sweeps back and
//! forth around its mounted facing. It never moves; when it spots the
//! player the simulation relays an alert to nearby guards.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::core::CameraConfig;
use crate::perception::{BodyId, PerceptionService, PhysicsQuery, Sighting, VisionCone};

#[derive(Debug, Clone)]
pub struct SecurityCamera {
    cone: VisionCone,
    /// Sweep amplitude either side of the mounted facing, in radians
    sweep: f32,
    /// Seconds per full sweep
    sweep_period: f32,
    /// Guards within this distance receive alerts
    alert_radius: f32,
    elapsed: f32,
    spotted: Option<Sighting>,
}

impl SecurityCamera {
    #[must_use]
    pub fn new(body: BodyId, config: &CameraConfig) -> Self {
        Self {
            cone: VisionCone::new(body, &config.vision),
            sweep: config.sweep,
            sweep_period: config.sweep_period,
            alert_radius: config.alert_radius,
            elapsed: 0.0,
            spotted: None,
        }
    }

    /// Advance the sweep and rebuild the cone.
    ///
    /// Returns `false` when the camera's body is gone.
    pub fn update(&mut self, dt: f32, world: &impl PhysicsQuery) -> bool {
        self.elapsed += dt.max(0.0);
        if self.sweep_period > 0.0 {
            self.elapsed %= self.sweep_period;
            self.cone.angle_offset = self.sweep * (TAU * self.elapsed / self.sweep_period).sin();
        }
        self.cone.update(world)
    }

    /// Look for `target`; remembers the result until the next call
    pub fn scan(
        &mut self,
        world: &impl PhysicsQuery,
        perception: &PerceptionService,
        target: BodyId,
    ) -> Option<Sighting> {
        self.spotted = perception.observe(world, &self.cone, target);
        self.spotted
    }

    /// Whether `point` is close enough to hear this camera's alerts
    #[must_use]
    pub fn in_alert_range(&self, point: Vec2) -> bool {
        self.cone.origin().distance(point) <= self.alert_radius
    }

    #[must_use]
    pub fn body(&self) -> BodyId {
        self.cone.body()
    }

    #[must_use]
    pub fn cone(&self) -> &VisionCone {
        &self.cone
    }

    /// Result of the latest scan
    #[must_use]
    pub fn spotted(&self) -> Option<Sighting> {
        self.spotted
    }
}
