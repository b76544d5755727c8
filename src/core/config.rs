//! AI tuning parameters
//!
//! Every tunable is injected at construction, normally from level data.
//! Distances are in world units, rates are per second.

use serde::{Deserialize, Serialize};

use crate::perception::GROUP_STATIC;

/// Per-guard state machine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Suspicion at which a guard gives chase
    pub max_suspicion: f32,
    /// Suspicion at or above which a guard is suspicious
    pub suspicious_threshold: f32,
    /// Gain per second when the player is right in front of the guard
    pub suspicion_rate_near: f32,
    /// Gain per second at the edge of the sight range
    pub suspicion_rate_far: f32,
    /// Decay per second while the player is not seen
    pub suspicion_decay_rate: f32,
    /// Seconds of lost contact before a chase is abandoned
    pub de_aggro_time: f32,
    /// Ticks a state must be held before it may change (distractions excepted)
    pub min_state_ticks: u32,
    /// Distance at which a target location counts as reached
    pub arrival_radius: f32,
    /// Seconds spent looking around after reaching a distraction
    pub look_around_time: f32,
    /// Seconds per full look-around sweep
    pub look_around_period: f32,
    /// Look-around sweep amplitude, in radians
    pub look_around_sweep: f32,
    /// Movement force while patrolling or looking around
    pub patrol_force: f32,
    /// Movement force while suspicious, alerted or distracted
    pub alert_force: f32,
    /// Movement force while chasing
    pub chase_force: f32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            max_suspicion: 100.0,
            suspicious_threshold: 40.0,
            suspicion_rate_near: 80.0,
            suspicion_rate_far: 25.0,
            suspicion_decay_rate: 10.0,
            de_aggro_time: 3.0,
            min_state_ticks: 5,
            arrival_radius: 0.5,
            look_around_time: 3.0,
            look_around_period: 1.5,
            look_around_sweep: 1.0,
            patrol_force: 1.0,
            alert_force: 1.5,
            chase_force: 2.2,
        }
    }
}

impl GuardConfig {
    /// Set suspicion maximum and the suspicious threshold
    #[must_use]
    pub fn with_suspicion(mut self, max: f32, threshold: f32) -> Self {
        self.max_suspicion = max;
        self.suspicious_threshold = threshold;
        self
    }

    /// Set near and far suspicion gain rates
    #[must_use]
    pub fn with_suspicion_rates(mut self, near: f32, far: f32) -> Self {
        self.suspicion_rate_near = near;
        self.suspicion_rate_far = far;
        self
    }

    #[must_use]
    pub fn with_decay_rate(mut self, rate: f32) -> Self {
        self.suspicion_decay_rate = rate;
        self
    }

    #[must_use]
    pub fn with_de_aggro_time(mut self, seconds: f32) -> Self {
        self.de_aggro_time = seconds;
        self
    }

    #[must_use]
    pub fn with_min_state_ticks(mut self, ticks: u32) -> Self {
        self.min_state_ticks = ticks;
        self
    }

    #[must_use]
    pub fn with_arrival_radius(mut self, radius: f32) -> Self {
        self.arrival_radius = radius;
        self
    }

    /// Set look-around duration and sweep period
    #[must_use]
    pub fn with_look_around(mut self, time: f32, period: f32) -> Self {
        self.look_around_time = time;
        self.look_around_period = period;
        self
    }
}

/// Vision cone shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// View distance
    pub radius: f32,
    /// Half of the opening angle, in radians
    pub half_angle: f32,
    /// Boundary rays per rebuild
    pub num_rays: usize,
    /// Collision groups that truncate the cone
    pub filter_mask: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            radius: 8.0,
            half_angle: 0.6,
            num_rays: 16,
            filter_mask: GROUP_STATIC,
        }
    }
}

impl VisionConfig {
    #[must_use]
    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub fn with_half_angle(mut self, half_angle: f32) -> Self {
        self.half_angle = half_angle;
        self
    }

    #[must_use]
    pub fn with_num_rays(mut self, num_rays: usize) -> Self {
        self.num_rays = num_rays;
        self
    }
}

/// Line-of-sight query settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SightConfig {
    /// Rays longer than this never see their target
    pub max_distance: f32,
    /// Perpendicular clearance required along an unobstructed line
    pub margin: Option<f32>,
    /// Sample points for the margin check
    pub margin_samples: usize,
    /// Alternate rays per side when the direct ray is blocked
    pub fan_rays: usize,
    /// Angle of the outermost alternate ray, in radians
    pub fan_spread: f32,
    /// Collision groups that block sight
    pub filter_mask: u32,
}

impl Default for SightConfig {
    fn default() -> Self {
        Self {
            max_distance: 12.0,
            margin: None,
            margin_samples: 3,
            fan_rays: 2,
            fan_spread: 0.175,
            filter_mask: GROUP_STATIC,
        }
    }
}

impl SightConfig {
    #[must_use]
    pub fn with_max_distance(mut self, max_distance: f32) -> Self {
        self.max_distance = max_distance;
        self
    }

    #[must_use]
    pub fn with_margin(mut self, margin: f32, samples: usize) -> Self {
        self.margin = Some(margin);
        self.margin_samples = samples;
        self
    }

    #[must_use]
    pub fn with_fan(mut self, rays: usize, spread: f32) -> Self {
        self.fan_rays = rays;
        self.fan_spread = spread;
        self
    }
}

/// Everything the AI core needs from level data
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub guard: GuardConfig,
    pub vision: VisionConfig,
    pub sight: SightConfig,
    pub camera: CameraConfig,
}

impl AiConfig {
    #[must_use]
    pub fn with_guard(mut self, guard: GuardConfig) -> Self {
        self.guard = guard;
        self
    }

    #[must_use]
    pub fn with_vision(mut self, vision: VisionConfig) -> Self {
        self.vision = vision;
        self
    }

    #[must_use]
    pub fn with_sight(mut self, sight: SightConfig) -> Self {
        self.sight = sight;
        self
    }

    #[must_use]
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }
}

/// Security camera settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub vision: VisionConfig,
    /// Sweep amplitude either side of the mounted facing, in radians
    pub sweep: f32,
    /// Seconds per full sweep
    pub sweep_period: f32,
    /// Guards within this distance of the camera receive its alerts
    pub alert_radius: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            vision: VisionConfig {
                radius: 10.0,
                half_angle: 0.35,
                num_rays: 12,
                filter_mask: GROUP_STATIC,
            },
            sweep: 0.8,
            sweep_period: 8.0,
            alert_radius: 15.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds_are_ordered() {
        let config = GuardConfig::default();
        assert!(config.suspicious_threshold > 0.0);
        assert!(config.suspicious_threshold < config.max_suspicion);
        assert!(config.suspicion_rate_near >= config.suspicion_rate_far);
    }

    #[test]
    fn test_builders() {
        let config = GuardConfig::default()
            .with_suspicion(10.0, 4.0)
            .with_de_aggro_time(1.5)
            .with_min_state_ticks(0);

        assert_eq!(config.max_suspicion, 10.0);
        assert_eq!(config.suspicious_threshold, 4.0);
        assert_eq!(config.de_aggro_time, 1.5);
        assert_eq!(config.min_state_ticks, 0);

        let sight = SightConfig::default().with_margin(0.25, 5).with_fan(3, 0.3);
        assert_eq!(sight.margin, Some(0.25));
        assert_eq!(sight.margin_samples, 5);
        assert_eq!(sight.fan_rays, 3);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config: AiConfig =
            ron::from_str("(guard: (max_suspicion: 50.0), camera: (sweep: 0.0))").unwrap();

        assert_eq!(config.guard.max_suspicion, 50.0);
        assert_eq!(
            config.guard.suspicious_threshold,
            GuardConfig::default().suspicious_threshold
        );
        assert_eq!(config.camera.sweep, 0.0);
        assert_eq!(config.vision, VisionConfig::default());
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AiConfig::default().with_sight(SightConfig::default().with_max_distance(4.0));
        let json = serde_json::to_string(&config).unwrap();
        let loaded: AiConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, config);
    }
}
