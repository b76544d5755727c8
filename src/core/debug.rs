//! Debug and statistics module

use std::collections::VecDeque;
use std::time::Duration;

use arrayvec::ArrayVec;
use glam::Vec2;

use crate::ai::{GuardBehavior, GuardId, GuardState};
use crate::perception::{MAX_CONE_RAYS, VisionCone};

/// Rolling AI tick timings
#[derive(Debug)]
pub struct TickStats {
    /// Tick time history for averaging
    tick_times: VecDeque<Duration>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Average tick time in milliseconds
    avg_tick_time_ms: f32,
    /// Minimum tick time in milliseconds
    min_tick_time_ms: f32,
    /// Maximum tick time in milliseconds
    max_tick_time_ms: f32,
    /// Total ticks recorded
    total_ticks: u64,
}

impl TickStats {
    pub fn new() -> Self {
        Self::with_samples(120)
    }

    pub fn with_samples(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            tick_times: VecDeque::with_capacity(max_samples),
            max_samples,
            avg_tick_time_ms: 0.0,
            min_tick_time_ms: 0.0,
            max_tick_time_ms: 0.0,
            total_ticks: 0,
        }
    }

    /// Record how long one AI tick took
    pub fn record_tick(&mut self, elapsed: Duration) {
        self.total_ticks += 1;

        if self.tick_times.len() >= self.max_samples {
            self.tick_times.pop_front();
        }
        self.tick_times.push_back(elapsed);

        self.update_stats();
    }

    fn update_stats(&mut self) {
        let Some(&first) = self.tick_times.front() else {
            return;
        };

        let mut total = Duration::ZERO;
        let mut min = first;
        let mut max = first;
        for &dt in &self.tick_times {
            total += dt;
            min = min.min(dt);
            max = max.max(dt);
        }

        let count = self.tick_times.len() as f32;
        self.avg_tick_time_ms = total.as_secs_f32() / count * 1000.0;
        self.min_tick_time_ms = min.as_secs_f32() * 1000.0;
        self.max_tick_time_ms = max.as_secs_f32() * 1000.0;
    }

    pub fn avg_tick_time_ms(&self) -> f32 {
        self.avg_tick_time_ms
    }

    pub fn min_tick_time_ms(&self) -> f32 {
        self.min_tick_time_ms
    }

    pub fn max_tick_time_ms(&self) -> f32 {
        self.max_tick_time_ms
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn format_stats(&self) -> String {
        format!(
            "AI tick: {:.3}ms (min: {:.3}, max: {:.3}) over {} ticks",
            self.avg_tick_time_ms, self.min_tick_time_ms, self.max_tick_time_ms, self.total_ticks
        )
    }
}

impl Default for TickStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of one guard for a debug overlay
#[derive(Debug, Clone)]
pub struct GuardDebug {
    pub guard: GuardId,
    pub state: GuardState,
    pub suspicion: f32,
    pub max_suspicion: f32,
    pub target: Option<Vec2>,
    pub direction: Vec2,
    pub facing: f32,
    /// Cone fan: apex first, then ray ends
    pub cone: ArrayVec<Vec2, { MAX_CONE_RAYS + 1 }>,
}

impl GuardDebug {
    #[must_use]
    pub fn capture(guard: GuardId, behavior: &GuardBehavior, cone: &VisionCone) -> Self {
        Self {
            guard,
            state: behavior.state(),
            suspicion: behavior.suspicion().level(),
            max_suspicion: behavior.suspicion().max(),
            target: behavior.next_target(),
            direction: behavior.movement_direction(),
            facing: behavior.facing(),
            cone: cone.polygon().iter().copied().collect(),
        }
    }

    /// One overlay line
    #[must_use]
    pub fn format_line(&self) -> String {
        let target = self
            .target
            .map_or_else(|| String::from("none"), |t| format!("({:.1}, {:.1})", t.x, t.y));
        format!(
            "guard {:>2} {:<13} sus {:>5.1}/{:<5.1} target {}",
            self.guard.0,
            self.state.name(),
            self.suspicion,
            self.max_suspicion,
            target
        )
    }
}

/// Debug overlay information
#[derive(Debug, Default)]
pub struct DebugInfo {
    /// Whether the overlay is enabled
    pub enabled: bool,
    pub tick_stats: TickStats,
    /// Per-guard snapshots from the last tick
    guards: Vec<GuardDebug>,
}

impl DebugInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Replace the guard snapshots
    pub fn set_guards(&mut self, guards: impl IntoIterator<Item = GuardDebug>) {
        self.guards.clear();
        self.guards.extend(guards);
    }

    pub fn guards(&self) -> &[GuardDebug] {
        &self.guards
    }

    pub fn record_tick(&mut self, elapsed: Duration) {
        self.tick_stats.record_tick(elapsed);
    }

    /// Stats line followed by one line per guard
    pub fn get_all_lines(&self) -> Vec<String> {
        let mut lines = vec![self.tick_stats.format_stats()];
        lines.extend(self.guards.iter().map(GuardDebug::format_line));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GuardConfig, VisionConfig};
    use crate::perception::BodyId;

    #[test]
    fn test_tick_stats_window() {
        let mut stats = TickStats::with_samples(3);
        for ms in [1, 2, 3, 10] {
            stats.record_tick(Duration::from_millis(ms));
        }

        assert_eq!(stats.total_ticks(), 4);
        assert!((stats.avg_tick_time_ms() - 5.0).abs() < 1e-3);
        assert!((stats.min_tick_time_ms() - 2.0).abs() < 1e-3);
        assert!((stats.max_tick_time_ms() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_guard_snapshot_lines() {
        let behavior = GuardBehavior::new(GuardConfig::default(), Vec2::ZERO, 0.0);
        let cone = VisionCone::new(BodyId::new(0, 0), &VisionConfig::default());
        let snapshot = GuardDebug::capture(GuardId(3), &behavior, &cone);

        assert_eq!(snapshot.state, GuardState::Patrol);
        assert!(snapshot.cone.is_empty());

        let mut debug = DebugInfo::new();
        debug.set_guards([snapshot]);
        let lines = debug.get_all_lines();

        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("Patrol"));
        assert!(lines[1].contains("target none"));
    }

    #[test]
    fn test_toggle() {
        let mut debug = DebugInfo::new();
        assert!(!debug.enabled);
        debug.toggle();
        assert!(debug.enabled);
    }
}
