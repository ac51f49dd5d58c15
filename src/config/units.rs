//! Unit types for physical quantities.
//!
//! Provides type-safe representations of angles, rotation rates and step
//! counts to prevent unit confusion at compile time. Rates are expressed in
//! revolutions per second, the native unit of the ramp arithmetic.

use core::ops::{Add, Mul, Sub};

use serde::Deserialize;

/// Angular position in degrees.
///
/// Used for the user-facing API. Internally converted to [`Steps`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f32);

impl Degrees {
    /// Create a new Degrees value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl Add for Degrees {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Degrees {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Net shaft rotation in revolutions.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Revolutions(pub f32);

impl Revolutions {
    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }

    /// Total angle swept, including whole revolutions.
    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0 * 360.0)
    }

    /// Angle within the current revolution, in `(-360, 360)`.
    #[inline]
    pub fn degrees_within_revolution(self) -> Degrees {
        Degrees(libm::fmodf(self.0, 1.0) * 360.0)
    }
}

/// Rotation rate in revolutions per second.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct RevsPerSec(pub f32);

impl RevsPerSec {
    /// Create a new RevsPerSec value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl Mul<f32> for RevsPerSec {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Rotational acceleration in revolutions per second squared.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct RevsPerSecSquared(pub f32);

impl RevsPerSecSquared {
    /// Create a new RevsPerSecSquared value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

/// Linear position or distance along a slide, in configured slide units.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Deserialize)]
#[serde(transparent)]
pub struct SlideUnits(pub f32);

impl SlideUnits {
    /// Create a new SlideUnits value.
    #[inline]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl Add for SlideUnits {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for SlideUnits {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Net displacement in steps (signed; positive is clockwise).
///
/// Uses i64 for unlimited range in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Steps(pub i64);

impl Steps {
    /// Create a new Steps value.
    #[inline]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Get absolute value as u64.
    #[inline]
    pub fn abs(self) -> u64 {
        self.0.unsigned_abs()
    }
}

impl Add for Steps {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Steps {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// Extension trait for creating unit types from primitives.
pub trait UnitExt {
    /// Convert to Degrees.
    fn degrees(self) -> Degrees;
    /// Convert to RevsPerSec.
    fn rps(self) -> RevsPerSec;
    /// Convert to RevsPerSecSquared.
    fn rpss(self) -> RevsPerSecSquared;
    /// Convert to SlideUnits.
    fn slide_units(self) -> SlideUnits;
}

impl UnitExt for f32 {
    #[inline]
    fn degrees(self) -> Degrees {
        Degrees(self)
    }

    #[inline]
    fn rps(self) -> RevsPerSec {
        RevsPerSec(self)
    }

    #[inline]
    fn rpss(self) -> RevsPerSecSquared {
        RevsPerSecSquared(self)
    }

    #[inline]
    fn slide_units(self) -> SlideUnits {
        SlideUnits(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revolutions_to_degrees() {
        let revs = Revolutions(1.5);
        assert!((revs.to_degrees().value() - 540.0).abs() < 0.001);
    }

    #[test]
    fn test_degrees_within_revolution() {
        let revs = Revolutions(2.25);
        assert!((revs.degrees_within_revolution().value() - 90.0).abs() < 0.01);

        // Negative net rotation keeps its sign, mirroring fmod.
        let revs = Revolutions(-0.25);
        assert!((revs.degrees_within_revolution().value() + 90.0).abs() < 0.01);
    }

    #[test]
    fn test_steps_arithmetic() {
        let delta = Steps(150) - Steps(200);
        assert_eq!(delta, Steps(-50));
        assert_eq!(delta.abs(), 50);
        assert_eq!((Steps(30) + Steps(12)).value(), 42);
    }

    #[test]
    fn test_unit_ext() {
        assert_eq!(90.0.degrees(), Degrees(90.0));
        assert_eq!(1.5.rps(), RevsPerSec(1.5));
    }
}
