//! Configuration validation.

use crate::error::{ConfigError, Error, Result};

use super::AxisConfig;

/// Validate an axis configuration.
///
/// Checks:
/// - steps per revolution is non-zero
/// - velocity bounds satisfy `0 < min <= max`
/// - acceleration and homing rates are positive
/// - slide units per revolution, when given, is positive
pub fn validate_config(config: &AxisConfig) -> Result<()> {
    if config.steps_per_revolution == 0 {
        return Err(Error::Config(ConfigError::InvalidStepsPerRevolution(
            config.steps_per_revolution,
        )));
    }

    let min = config.min_rps.value();
    let max = config.max_rps.value();
    if min <= 0.0 || max <= 0.0 || min > max {
        return Err(Error::Config(ConfigError::InvalidVelocityRange { min, max }));
    }

    if config.rpss.value() <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidAcceleration(
            config.rpss.value(),
        )));
    }

    if config.homing_rps.value() <= 0.0 {
        return Err(Error::Config(ConfigError::InvalidHomingRate(
            config.homing_rps.value(),
        )));
    }

    if let Some(per_rev) = config.slide_units_per_rev {
        if per_rev <= 0.0 {
            return Err(Error::Config(ConfigError::InvalidSlideUnits(per_rev)));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::{RevsPerSec, RevsPerSecSquared};

    #[test]
    fn test_valid_default() {
        assert!(validate_config(&AxisConfig::default()).is_ok());
    }

    #[test]
    fn test_zero_steps_rejected() {
        let config = AxisConfig {
            steps_per_revolution: 0,
            ..AxisConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidStepsPerRevolution(0)))
        ));
    }

    #[test]
    fn test_inverted_velocity_range_rejected() {
        let config = AxisConfig {
            min_rps: RevsPerSec(2.0),
            max_rps: RevsPerSec(1.0),
            ..AxisConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidVelocityRange { .. }))
        ));
    }

    #[test]
    fn test_zero_acceleration_rejected() {
        let config = AxisConfig {
            rpss: RevsPerSecSquared(0.0),
            ..AxisConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidAcceleration(_)))
        ));
    }

    #[test]
    fn test_negative_slide_units_rejected() {
        let config = AxisConfig {
            slide_units_per_rev: Some(-0.1),
            ..AxisConfig::default()
        };
        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidSlideUnits(_)))
        ));
    }
}
