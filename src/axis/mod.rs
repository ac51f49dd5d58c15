//! Axis controller and its builder.

mod builder;
mod driver;

pub use builder::StepperAxisBuilder;
pub use driver::{StepperAxis, DEFAULT_HOMING_TIMEOUT, HOMED, TRAVEL_ENDED};
