//! Motion planning and scheduling.
//!
//! [`ramp`] computes the velocity profile; [`scheduler`] turns it into
//! per-tick effects for the step timer.

pub mod ramp;
pub mod scheduler;

pub use ramp::{Direction, RampParams};
pub use scheduler::{StepScheduler, Wake};
