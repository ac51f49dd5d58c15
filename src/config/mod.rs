//! Configuration module for stepdrive.
//!
//! Provides the axis configuration type, validation, derived conversion
//! geometry and a TOML loader (with the `std` feature).

mod axis;
mod geometry;
#[cfg(feature = "std")]
mod loader;
pub mod units;
mod validation;

pub use axis::{
    AxisConfig, DEFAULT_HOMING_RPS, DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAX_RPS, DEFAULT_MIN_RPS,
    DEFAULT_RPSS,
};
pub use geometry::AxisGeometry;
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{Degrees, Revolutions, RevsPerSec, RevsPerSecSquared, SlideUnits, Steps, UnitExt};
