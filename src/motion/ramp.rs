//! Trapezoidal velocity ramp planning.
//!
//! The ramp is linear in velocity: the motor accelerates from the minimum
//! rate toward the maximum by a fixed increment per step, cruises if the
//! move is long enough, then mirrors the same increments back down from the
//! deceleration trigger point. Short moves degrade to a triangle peaking at
//! the midpoint.

use libm::sqrtf;

use crate::config::units::{RevsPerSec, RevsPerSecSquared};

/// Direction of axis rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Clockwise (positive step count).
    Clockwise,
    /// Anticlockwise (negative step count).
    Anticlockwise,
}

impl Direction {
    /// Get direction from a signed step delta.
    #[inline]
    pub fn from_delta(delta: i64) -> Self {
        if delta >= 0 {
            Direction::Clockwise
        } else {
            Direction::Anticlockwise
        }
    }

    /// Get the sign multiplier.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Clockwise => 1,
            Direction::Anticlockwise => -1,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Clockwise => Direction::Anticlockwise,
            Direction::Anticlockwise => Direction::Clockwise,
        }
    }
}

/// Precomputed ramp parameters for one axis.
///
/// Derived from the velocity bounds and the configured acceleration; must be
/// re-derived whenever any of those three inputs changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampParams {
    /// Maximum step rate in rev/s; the ramp plateau.
    pub max_rps: f32,

    /// Minimum step rate in rev/s; every move starts and ends here.
    pub min_rps: f32,

    /// Velocity increment applied once per physical step, in rev/s.
    pub rps_interval: f32,

    /// Steps needed to reach `max_rps` from `min_rps`.
    pub acceleration_steps: u32,
}

impl RampParams {
    /// Derive ramp parameters from velocity bounds and acceleration.
    ///
    /// The per-step increment scales the minimum rate by the acceleration
    /// magnitude relative to the velocity span, so a harder acceleration
    /// setting yields fewer, larger increments.
    pub fn derive(max: RevsPerSec, min: RevsPerSec, accel: RevsPerSecSquared) -> Self {
        let max_rps = max.value();
        let min_rps = min.value();
        let rpss = accel.value();

        let ramp_time = sqrtf(rpss * rpss + max_rps * max_rps);
        let rps_interval = min_rps / ramp_time;
        let acceleration_steps = if rps_interval > 0.0 {
            (max_rps / rps_interval) as u32
        } else {
            0
        };

        Self {
            max_rps,
            min_rps,
            rps_interval,
            acceleration_steps,
        }
    }

    /// Remaining-step count at which deceleration begins for a move of the
    /// given size: `min(acceleration_steps, steps / 2)`.
    ///
    /// The symmetric mirror from the end guarantees the velocity is back at
    /// the minimum when the last step executes, even for moves too short to
    /// reach the plateau.
    #[inline]
    pub fn deceleration_trigger(&self, steps: u32) -> u32 {
        self.acceleration_steps.min(steps / 2)
    }

    /// Per-step velocity update rule.
    ///
    /// Accelerates while more steps remain than the trigger, decelerates
    /// otherwise; clamped to `[min_rps, max_rps]` with no intermediate
    /// excursion outside the band.
    #[inline]
    pub fn advance(&self, velocity: f32, remaining: u32, trigger: u32) -> f32 {
        if remaining > trigger {
            (velocity + self.rps_interval).min(self.max_rps)
        } else {
            (velocity - self.rps_interval).max(self.min_rps)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::UnitExt;

    fn params() -> RampParams {
        RampParams::derive(1.0.rps(), 0.005.rps(), 1.0.rpss())
    }

    #[test]
    fn test_trigger_short_move() {
        let p = params();
        // Moves shorter than twice the acceleration distance peak at the
        // midpoint.
        assert_eq!(p.deceleration_trigger(10), 5);
        assert_eq!(p.deceleration_trigger(1), 0);
    }

    #[test]
    fn test_trigger_long_move() {
        let p = params();
        let long = p.acceleration_steps * 4;
        assert_eq!(p.deceleration_trigger(long), p.acceleration_steps);
    }

    #[test]
    fn test_advance_clamps_at_max() {
        let p = params();
        let mut v = p.min_rps;
        for _ in 0..p.acceleration_steps * 2 {
            v = p.advance(v, 1000, 10);
            assert!(v <= p.max_rps);
            assert!(v >= p.min_rps);
        }
        assert!((v - p.max_rps).abs() < 1e-6);
    }

    #[test]
    fn test_advance_clamps_at_min() {
        let p = params();
        let mut v = p.max_rps;
        for _ in 0..p.acceleration_steps * 2 {
            v = p.advance(v, 5, 10);
            assert!(v >= p.min_rps);
        }
        assert!((v - p.min_rps).abs() < 1e-6);
    }

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::from_delta(5).sign(), 1);
        assert_eq!(Direction::from_delta(-5).sign(), -1);
        assert_eq!(Direction::from_delta(0), Direction::Clockwise);
        assert_eq!(Direction::Clockwise.reversed(), Direction::Anticlockwise);
    }

    proptest::proptest! {
        #[test]
        fn prop_trigger_formula(steps in 0u32..1_000_000) {
            let p = params();
            let trigger = p.deceleration_trigger(steps);
            proptest::prop_assert_eq!(trigger, p.acceleration_steps.min(steps / 2));
        }

        #[test]
        fn prop_velocity_stays_in_band(
            v in 0.005f32..1.0,
            remaining in 0u32..10_000,
            trigger in 0u32..5_000,
        ) {
            let p = params();
            let next = p.advance(v, remaining, trigger);
            proptest::prop_assert!(next >= p.min_rps - 1e-6);
            proptest::prop_assert!(next <= p.max_rps + 1e-6);
        }
    }
}
