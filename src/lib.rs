//! # stepdrive
//!
//! Asynchronous single-axis stepper motion control with embedded-hal 1.0
//! support.
//!
//! ## Features
//!
//! - **Trapezoidal ramps**: Velocity climbs from a floor rate toward a
//!   plateau and mirrors back down, one increment per physical step
//! - **Timer-paced stepping**: Each step schedules the next through a
//!   one-shot timer, so moves run without a blocked thread
//! - **Endstops and homing**: Two latched endstop inputs, a constant-rate
//!   homing run that zeros the position, and user callbacks per edge
//! - **Bounded waits**: Every API call either acquires the axis state
//!   within a configured bound or returns a contention error
//! - **Configuration-driven**: Axis geometry, rates and polarities load
//!   from TOML
//! - **embedded-hal 1.0**: Uses `OutputPin` for the enable, step and
//!   direction lines
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepdrive::axis::StepperAxisBuilder;
//! use stepdrive::platform::host::ThreadTimer;
//! use stepdrive::{Direction, UnitExt};
//!
//! let config = stepdrive::load_config("axis.toml")?;
//!
//! let (timer, hook) = ThreadTimer::spawn();
//! let axis = StepperAxisBuilder::new(enable_pin, step_pin, dir_pin, timer)
//!     .config(config)
//!     .build()?;
//! let pump = axis.clone();
//! hook.connect(move || pump.on_step_timer());
//!
//! axis.register_endstop(&mut lower_switch)?;
//! axis.home_default()?;
//! axis.rotate(90.0.degrees(), Direction::Clockwise)?;
//! axis.wait_for_travel_end(None)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables the axis controller, host platform
//!   adapters, synchronization primitives, file I/O and TOML parsing
//! - `alloc`: Enables heap allocation for no_std with allocator
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

#[cfg(feature = "alloc")]
extern crate alloc;

// Core modules, usable without std
pub mod config;
pub mod endstop;
pub mod error;
pub mod motion;
pub mod platform;

// The controller itself needs threads, Arc and blocking waits
#[cfg(feature = "std")]
pub mod axis;
#[cfg(feature = "std")]
pub mod sync;

// Re-exports for ergonomic API
#[cfg(feature = "std")]
pub use axis::{StepperAxis, StepperAxisBuilder};
pub use config::{validate_config, AxisConfig, AxisGeometry};
pub use endstop::{Edge, EndstopId, SlotUpdate};
pub use error::{Error, Result};
pub use motion::{Direction, RampParams, StepScheduler, Wake};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::load_config;

// Unit types
pub use config::units::{
    Degrees, Revolutions, RevsPerSec, RevsPerSecSquared, SlideUnits, Steps, UnitExt,
};
