//! Suspicion accumulator and de-aggro countdown

use crate::core::GuardConfig;

/// Suspicion level bounded to `[0, max]`.
///
/// Every mutation clamps, so no sequence of deltas can leave the range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Suspicion {
    level: f32,
    max: f32,
}

impl Suspicion {
    #[must_use]
    pub fn new(max: f32) -> Self {
        Self {
            level: 0.0,
            max: max.max(0.0),
        }
    }

    #[must_use]
    pub fn level(&self) -> f32 {
        self.level
    }

    #[must_use]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Level as a fraction of the maximum, in `[0, 1]`
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.level / self.max
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn is_max(&self) -> bool {
        self.level >= self.max
    }

    /// Set the level, clamped. NaN is treated as zero.
    pub fn set(&mut self, level: f32) {
        self.level = if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, self.max)
        };
    }

    pub fn raise(&mut self, amount: f32) {
        self.set(self.level + amount.max(0.0));
    }

    /// Decay toward zero
    pub fn decay(&mut self, amount: f32) {
        self.set(self.level - amount.max(0.0));
    }

    pub fn fill(&mut self) {
        self.level = self.max;
    }
}

/// Suspicion gain per second for a sighting at `distance`.
///
/// Interpolates from the near rate at the guard to the far rate at `range`.
#[must_use]
pub fn gain_rate(config: &GuardConfig, distance: f32, range: f32) -> f32 {
    let closeness = if range > 0.0 {
        1.0 - (distance / range).clamp(0.0, 1.0)
    } else {
        1.0
    };
    config.suspicion_rate_far + (config.suspicion_rate_near - config.suspicion_rate_far) * closeness
}

/// Share of the duration below which a countdown counts as finished.
/// Summing fractional f32 ticks leaves a residue of this order.
const EXPIRY_TOLERANCE: f32 = 1e-4;

/// Countdown after which a chasing guard gives up
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeAggroTimer {
    remaining: f32,
    duration: f32,
}

impl DeAggroTimer {
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining <= self.duration * EXPIRY_TOLERANCE
    }

    pub fn reset(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
        self.remaining = self.duration;
    }

    /// Count down, never below zero
    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
        if self.is_expired() {
            self.remaining = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suspicion_stays_bounded() {
        let mut suspicion = Suspicion::new(10.0);

        for i in 0..1000 {
            let delta = ((i * 37) % 23) as f32 - 11.0;
            if i % 3 == 0 {
                suspicion.decay(delta.abs() * 1.7);
            } else {
                suspicion.raise(delta.abs() * 0.9);
            }
            assert!(suspicion.level() >= 0.0);
            assert!(suspicion.level() <= 10.0);
        }

        suspicion.raise(f32::MAX);
        assert_eq!(suspicion.level(), 10.0);
        assert!(suspicion.is_max());

        suspicion.decay(f32::INFINITY);
        assert_eq!(suspicion.level(), 0.0);
    }

    #[test]
    fn test_negative_deltas_are_ignored() {
        let mut suspicion = Suspicion::new(10.0);
        suspicion.set(5.0);

        suspicion.raise(-3.0);
        assert_eq!(suspicion.level(), 5.0);
        suspicion.decay(-3.0);
        assert_eq!(suspicion.level(), 5.0);
    }

    #[test]
    fn test_nan_resets_to_zero() {
        let mut suspicion = Suspicion::new(10.0);
        suspicion.set(f32::NAN);
        assert_eq!(suspicion.level(), 0.0);
    }

    #[test]
    fn test_gain_rate_faster_when_closer() {
        let config = GuardConfig::default().with_suspicion_rates(90.0, 30.0);

        assert!((gain_rate(&config, 0.0, 10.0) - 90.0).abs() < 1e-4);
        assert!((gain_rate(&config, 10.0, 10.0) - 30.0).abs() < 1e-4);
        assert!((gain_rate(&config, 5.0, 10.0) - 60.0).abs() < 1e-4);
        assert!((gain_rate(&config, 50.0, 10.0) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_de_aggro_timer() {
        let mut timer = DeAggroTimer::default();
        assert!(timer.is_expired());

        timer.reset(2.0);
        timer.tick(0.5);
        assert!((timer.remaining() - 1.5).abs() < 1e-6);
        assert!(!timer.is_expired());

        timer.tick(5.0);
        assert_eq!(timer.remaining(), 0.0);
        assert!(timer.is_expired());
    }

    /// Ticks of `dt` until a fresh `duration` countdown expires
    fn ticks_to_expire(duration: f32, dt: f32) -> u32 {
        let mut timer = DeAggroTimer::default();
        timer.reset(duration);
        let mut ticks = 0;
        while !timer.is_expired() {
            timer.tick(dt);
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn test_de_aggro_timer_fractional_ticks() {
        assert_eq!(ticks_to_expire(0.5, 0.1), 5);
        assert_eq!(ticks_to_expire(1.0, 0.1), 10);
        assert_eq!(ticks_to_expire(3.0, 1.0 / 60.0), 180);
        assert_eq!(ticks_to_expire(2.0, 1.0 / 30.0), 60);
    }

    #[test]
    fn test_de_aggro_timer_not_early() {
        let mut timer = DeAggroTimer::default();
        timer.reset(3.0);
        for _ in 0..179 {
            timer.tick(1.0 / 60.0);
        }
        assert!(!timer.is_expired());
        assert!((timer.remaining() - 1.0 / 60.0).abs() < 1e-4);
    }
}
