//! Axis configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::units::{RevsPerSec, RevsPerSecSquared, SlideUnits};

/// Default maximum rotation rate in rev/s.
pub const DEFAULT_MAX_RPS: f32 = 1.0;
/// Default minimum rotation rate in rev/s; every ramp starts and ends here.
pub const DEFAULT_MIN_RPS: f32 = 0.005;
/// Default ramp acceleration in rev/s².
pub const DEFAULT_RPSS: f32 = 1.0;
/// Default constant rate used while homing, in rev/s.
pub const DEFAULT_HOMING_RPS: f32 = 0.25;
/// Default bounded-wait limit for the axis state lock, in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 50;

/// Complete axis configuration from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisConfig {
    /// Human-readable name (max 32 chars).
    #[serde(default = "default_name")]
    pub name: String<32>,

    /// Steps per complete shaft revolution (typically 200 for 1.8° motors).
    pub steps_per_revolution: u32,

    /// Linear slide units moved per revolution, for lead-screw axes.
    #[serde(default)]
    pub slide_units_per_rev: Option<f32>,

    /// Maximum rotation rate in revolutions per second.
    #[serde(default = "default_max_rps")]
    pub max_rps: RevsPerSec,

    /// Minimum rotation rate in revolutions per second. Moves start from and
    /// decelerate back to this rate.
    #[serde(default = "default_min_rps")]
    pub min_rps: RevsPerSec,

    /// Ramp acceleration in revolutions per second squared.
    #[serde(default = "default_rpss")]
    pub rpss: RevsPerSecSquared,

    /// Constant rate used while homing toward an endstop.
    #[serde(default = "default_homing_rps")]
    pub homing_rps: RevsPerSec,

    /// Reverse the rotation sense of the direction line.
    #[serde(default)]
    pub invert_rotation: bool,

    /// Treat endstop inputs as active-low.
    #[serde(default)]
    pub invert_endstops: bool,

    /// Flip the linear direction mapping of slide moves.
    #[serde(default)]
    pub invert_slide: bool,

    /// Keep the driver energized (holding torque) after a move or hit.
    #[serde(default = "default_true")]
    pub active_braking: bool,

    /// Driver enable line is active-low (common for StepStick-style drivers).
    #[serde(default = "default_true")]
    pub enable_active_low: bool,

    /// Offset applied to the slide zero point.
    #[serde(default)]
    pub slide_offset: SlideUnits,

    /// Bounded-wait limit for the axis state lock, in milliseconds.
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_name() -> String<32> {
    String::try_from("axis").unwrap_or_default()
}

fn default_max_rps() -> RevsPerSec {
    RevsPerSec(DEFAULT_MAX_RPS)
}

fn default_min_rps() -> RevsPerSec {
    RevsPerSec(DEFAULT_MIN_RPS)
}

fn default_rpss() -> RevsPerSecSquared {
    RevsPerSecSquared(DEFAULT_RPSS)
}

fn default_homing_rps() -> RevsPerSec {
    RevsPerSec(DEFAULT_HOMING_RPS)
}

fn default_true() -> bool {
    true
}

fn default_lock_timeout_ms() -> u64 {
    DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            steps_per_revolution: 200,
            slide_units_per_rev: None,
            max_rps: default_max_rps(),
            min_rps: default_min_rps(),
            rpss: default_rpss(),
            homing_rps: default_homing_rps(),
            invert_rotation: false,
            invert_endstops: false,
            invert_slide: false,
            active_braking: true,
            enable_active_low: true,
            slide_offset: SlideUnits(0.0),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

impl AxisConfig {
    /// Create a configuration with the given steps per revolution and
    /// defaults for everything else.
    pub fn with_steps_per_revolution(steps: u32) -> Self {
        Self {
            steps_per_revolution: steps,
            ..Self::default()
        }
    }

    /// Degrees rotated per step.
    #[inline]
    pub fn degrees_per_step(&self) -> f32 {
        360.0 / self.steps_per_revolution as f32
    }
}
