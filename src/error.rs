//! Error types for the stepdrive library.
//!
//! Every fault is reported to the caller as a value; no condition here is
//! fatal to the process. Errors are grouped the way callers recover from
//! them: contention (retry), state (change state first), resource
//! (permanent for the instance) and wait timeouts.

use core::fmt;

use crate::endstop::EndstopId;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepdrive operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The bounded lock acquisition wait was exceeded. Recoverable; the
    /// caller may simply retry.
    Contention,
    /// The axis is in the wrong state for the requested operation.
    State(StateError),
    /// A fixed resource of the axis instance is exhausted.
    Resource(ResourceError),
    /// A blocking wait exceeded the caller-supplied bound.
    Wait(WaitError),
    /// Configuration parsing or validation error.
    Config(ConfigError),
    /// A digital line write failed.
    Pin,
}

/// Wrong-state rejections. The caller must change state before retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateError {
    /// A move is already in flight; move requests are rejected, never queued.
    AlreadyTraveling,
    /// A homing sequence is already in progress.
    AlreadyHoming,
    /// An endstop hit has not been acknowledged; motion stays blocked until
    /// the caller clears it.
    EndstopEngaged(EndstopId),
    /// A slide operation was requested but no slide units-per-step is set.
    SlideUnitsNotSet,
}

/// Exhausted per-instance resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResourceError {
    /// Both endstop slots (lower, upper) are taken.
    NoFreeEndstops,
}

/// Caller-bounded waits that ran out of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitError {
    /// `home()` did not reach the endstop within the caller's timeout.
    /// Motion may still be winding down when this is returned.
    HomingTimeout,
    /// `wait_for_travel_end()` timed out; the move is still in progress.
    TravelWaitTimeout,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Contention => write!(f, "bounded lock wait exceeded"),
            Error::State(e) => write!(f, "state error: {}", e),
            Error::Resource(e) => write!(f, "resource error: {}", e),
            Error::Wait(e) => write!(f, "wait timeout: {}", e),
            Error::Config(e) => write!(f, "configuration error: {}", e),
            Error::Pin => write!(f, "digital line write failed"),
        }
    }
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::AlreadyTraveling => write!(f, "a move is already in flight"),
            StateError::AlreadyHoming => write!(f, "a homing sequence is already in progress"),
            StateError::EndstopEngaged(id) => {
                write!(f, "endstop {:?} engaged and not acknowledged", id)
            }
            StateError::SlideUnitsNotSet => write!(f, "slide units per step not configured"),
        }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceError::NoFreeEndstops => write!(f, "no free endstop slots"),
        }
    }
}

impl fmt::Display for WaitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitError::HomingTimeout => write!(f, "homing did not reach the endstop in time"),
            WaitError::TravelWaitTimeout => write!(f, "travel did not end in time"),
        }
    }
}

// Conversion impls
impl From<StateError> for Error {
    fn from(e: StateError) -> Self {
        Error::State(e)
    }
}

impl From<ResourceError> for Error {
    fn from(e: ResourceError) -> Self {
        Error::Resource(e)
    }
}

impl From<WaitError> for Error {
    fn from(e: WaitError) -> Self {
        Error::Wait(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration.
    ParseError(heapless::String<128>),
    /// Steps per revolution must be > 0.
    InvalidStepsPerRevolution(u32),
    /// Velocity bounds must satisfy 0 < min <= max.
    InvalidVelocityRange {
        /// Minimum rate in revolutions per second.
        min: f32,
        /// Maximum rate in revolutions per second.
        max: f32,
    },
    /// Acceleration must be > 0 rev/s².
    InvalidAcceleration(f32),
    /// Homing rate must be > 0 rev/s.
    InvalidHomingRate(f32),
    /// Slide units per revolution must be > 0 when given.
    InvalidSlideUnits(f32),
    /// File I/O error (std only).
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "parse error: {}", msg),
            ConfigError::InvalidStepsPerRevolution(v) => {
                write!(f, "invalid steps_per_revolution: {}. Must be > 0", v)
            }
            ConfigError::InvalidVelocityRange { min, max } => {
                write!(
                    f,
                    "invalid velocity range: min {} max {}. Need 0 < min <= max",
                    min, max
                )
            }
            ConfigError::InvalidAcceleration(v) => {
                write!(f, "invalid acceleration: {}. Must be > 0", v)
            }
            ConfigError::InvalidHomingRate(v) => {
                write!(f, "invalid homing rate: {}. Must be > 0", v)
            }
            ConfigError::InvalidSlideUnits(v) => {
                write!(f, "invalid slide units per revolution: {}. Must be > 0", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}
