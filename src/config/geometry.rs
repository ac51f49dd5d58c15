//! Derived axis geometry: the step/degree/slide conversion constants.
//!
//! Computed once from [`AxisConfig`] and used for all unit conversions.
//! Conversions to integer step counts round to the nearest step; the
//! inverse multiplications use the same constants, so round trips agree
//! to within one step.

use super::axis::AxisConfig;
use super::units::{Degrees, Revolutions, SlideUnits, Steps};

/// Conversion constants for one axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisGeometry {
    /// Steps per complete shaft revolution.
    pub steps_per_revolution: u32,

    /// Degrees rotated per step.
    pub degrees_per_step: f32,

    /// Linear slide units moved per step. `0.0` means no slide is configured.
    pub slide_units_per_step: f32,
}

impl AxisGeometry {
    /// Compute geometry from axis configuration.
    pub fn from_config(config: &AxisConfig) -> Self {
        let steps_per_revolution = config.steps_per_revolution;
        let degrees_per_step = 360.0 / steps_per_revolution as f32;
        let slide_units_per_step = match config.slide_units_per_rev {
            Some(per_rev) => per_rev / steps_per_revolution as f32,
            None => 0.0,
        };

        Self {
            steps_per_revolution,
            degrees_per_step,
            slide_units_per_step,
        }
    }

    /// True once a slide units-per-step ratio is configured.
    #[inline]
    pub fn has_slide_units(&self) -> bool {
        self.slide_units_per_step > 0.0
    }

    /// Convert an angle to the nearest whole step count.
    #[inline]
    pub fn degrees_to_steps(&self, degrees: Degrees) -> Steps {
        Steps(libm::roundf(degrees.0 / self.degrees_per_step) as i64)
    }

    /// Convert a step count to an angle.
    #[inline]
    pub fn steps_to_degrees(&self, steps: Steps) -> Degrees {
        Degrees(steps.0 as f32 * self.degrees_per_step)
    }

    /// Convert a slide distance to the nearest whole step count.
    #[inline]
    pub fn slide_to_steps(&self, distance: SlideUnits) -> Steps {
        Steps(libm::roundf(distance.0 / self.slide_units_per_step) as i64)
    }

    /// Convert a step count to a slide distance.
    #[inline]
    pub fn steps_to_slide(&self, steps: Steps) -> SlideUnits {
        SlideUnits(steps.0 as f32 * self.slide_units_per_step)
    }

    /// Net shaft rotation for a given step count.
    #[inline]
    pub fn revolutions(&self, steps: Steps) -> Revolutions {
        Revolutions(steps.0 as f32 / self.steps_per_revolution as f32)
    }

    /// Step period in microseconds for a rotation rate in rev/s.
    ///
    /// This is the re-arm delay of the step timer: one step every
    /// `1e6 / (steps_per_rev * rps)` microseconds.
    #[inline]
    pub fn step_period_micros(&self, rps: f32) -> u64 {
        if rps <= 0.0 {
            return u64::MAX;
        }
        (1_000_000.0 / (self.steps_per_revolution as f32 * rps)) as u64
    }
}
