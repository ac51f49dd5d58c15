//! Builder for [`StepperAxis`].

use std::time::Duration;

use embedded_hal::digital::OutputPin;

use crate::config::units::{RevsPerSec, RevsPerSecSquared, SlideUnits};
use crate::config::{validate_config, AxisConfig, AxisGeometry};
use crate::error::Result;
use crate::motion::{Direction, RampParams, StepScheduler};
use crate::platform::StepTimer;

use super::driver::{Inner, StepperAxis};

/// Assembles a [`StepperAxis`] from its pins, timer and configuration.
///
/// The pins and timer are required up front; everything else starts
/// from [`AxisConfig::default`] and can be overridden field by field or
/// wholesale with [`config`](StepperAxisBuilder::config).
///
/// ```ignore
/// let axis = StepperAxisBuilder::new(enable, step, dir, timer)
///     .steps_per_revolution(200)
///     .max_rps(2.0.rps())
///     .slide_units_per_rev(0.1)
///     .build()?;
/// ```
pub struct StepperAxisBuilder<EN, STEP, DIR, T> {
    enable_pin: EN,
    step_pin: STEP,
    dir_pin: DIR,
    timer: T,
    config: AxisConfig,
}

impl<EN, STEP, DIR, T> StepperAxisBuilder<EN, STEP, DIR, T>
where
    EN: OutputPin,
    STEP: OutputPin,
    DIR: OutputPin,
    T: StepTimer,
{
    /// Take ownership of the pins and timer, starting from default configuration.
    pub fn new(enable_pin: EN, step_pin: STEP, dir_pin: DIR, timer: T) -> Self {
        Self {
            enable_pin,
            step_pin,
            dir_pin,
            timer,
            config: AxisConfig::default(),
        }
    }

    /// Replace the whole configuration, typically one loaded from TOML.
    pub fn config(mut self, config: AxisConfig) -> Self {
        self.config = config;
        self
    }

    /// Steps per complete shaft revolution.
    pub fn steps_per_revolution(mut self, steps: u32) -> Self {
        self.config.steps_per_revolution = steps;
        self
    }

    /// Peak rotation rate.
    pub fn max_rps(mut self, max: RevsPerSec) -> Self {
        self.config.max_rps = max;
        self
    }

    /// Floor rotation rate, where every ramp starts and ends.
    pub fn min_rps(mut self, min: RevsPerSec) -> Self {
        self.config.min_rps = min;
        self
    }

    /// Ramp acceleration.
    pub fn rpss(mut self, rpss: RevsPerSecSquared) -> Self {
        self.config.rpss = rpss;
        self
    }

    /// Constant rate used while homing.
    pub fn homing_rps(mut self, rps: RevsPerSec) -> Self {
        self.config.homing_rps = rps;
        self
    }

    /// Linear slide units moved per revolution.
    pub fn slide_units_per_rev(mut self, per_rev: f32) -> Self {
        self.config.slide_units_per_rev = Some(per_rev);
        self
    }

    /// Offset added to absolute slide targets.
    pub fn slide_offset(mut self, offset: SlideUnits) -> Self {
        self.config.slide_offset = offset;
        self
    }

    /// Flip the rotation sense of the direction line.
    pub fn invert_rotation(mut self, invert: bool) -> Self {
        self.config.invert_rotation = invert;
        self
    }

    /// Treat endstop inputs as active-low.
    pub fn invert_endstops(mut self, invert: bool) -> Self {
        self.config.invert_endstops = invert;
        self
    }

    /// Flip the linear direction mapping of slide moves.
    pub fn invert_slide(mut self, invert: bool) -> Self {
        self.config.invert_slide = invert;
        self
    }

    /// Keep the driver energized between travels.
    pub fn active_braking(mut self, braking: bool) -> Self {
        self.config.active_braking = braking;
        self
    }

    /// Driver enable line is active-low.
    pub fn enable_active_low(mut self, active_low: bool) -> Self {
        self.config.enable_active_low = active_low;
        self
    }

    /// Bounded-wait limit for the axis state lock.
    pub fn lock_timeout(mut self, timeout: Duration) -> Self {
        self.config.lock_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Validate the configuration and bring up the axis.
    ///
    /// The driver is energized on return, matching power-on hold
    /// behavior. Position starts at step zero; home to establish a real
    /// origin.
    pub fn build(self) -> Result<StepperAxis<EN, STEP, DIR, T>> {
        let config = self.config;
        validate_config(&config)?;

        let geometry = AxisGeometry::from_config(&config);
        let ramp = RampParams::derive(config.max_rps, config.min_rps, config.rpss);
        let scheduler = StepScheduler::idle(&ramp);

        let mut inner = Inner {
            enable_pin: self.enable_pin,
            step_pin: self.step_pin,
            dir_pin: self.dir_pin,
            timer: self.timer,
            geometry,
            ramp,
            rpss: config.rpss,
            homing_rps: config.homing_rps.value(),
            scheduler,
            direction: Direction::Clockwise,
            enabled: false,
            enable_active_low: config.enable_active_low,
            active_braking: config.active_braking,
            invert_rotation: config.invert_rotation,
            invert_endstops: config.invert_endstops,
            invert_slide: config.invert_slide,
            slide_offset: config.slide_offset.value(),
            endstops: Default::default(),
        };

        StepperAxis::energize_on_build(&mut inner)?;

        let lock_bound = Duration::from_millis(config.lock_timeout_ms);
        Ok(StepperAxis::from_inner(inner, lock_bound))
    }
}
