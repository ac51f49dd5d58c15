//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::AxisConfig;

/// Wrapper matching the `[axis]` table of a configuration file.
#[derive(Debug, serde::Deserialize)]
struct ConfigFile {
    axis: AxisConfig,
}

/// Load an axis configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
///
/// # Example
///
/// ```rust,ignore
/// use stepdrive::load_config;
///
/// let config = load_config("axis.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AxisConfig> {
    let content = fs::read_to_string(path.as_ref())
        .map_err(|e| Error::Config(ConfigError::IoError(truncate_message(&e.to_string()))))?;

    parse_config(&content)
}

/// Parse an axis configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<AxisConfig> {
    let file: ConfigFile = toml::from_str(content)
        .map_err(|e| Error::Config(ConfigError::ParseError(truncate_message(e.message()))))?;

    super::validation::validate_config(&file.axis)?;

    Ok(file.axis)
}

/// Keep as much of `message` as fits the fixed-capacity error buffer,
/// cutting on a character boundary.
fn truncate_message(message: &str) -> heapless::String<128> {
    let mut out = heapless::String::new();
    for c in message.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
[axis]
steps_per_revolution = 200
"#;
        let config = parse_config(toml).expect("minimal config should parse");
        assert_eq!(config.steps_per_revolution, 200);
        assert_eq!(config.name.as_str(), "axis");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[axis]
name = "z_slide"
steps_per_revolution = 400
slide_units_per_rev = 0.008
max_rps = 2.0
min_rps = 0.01
rpss = 4.0
homing_rps = 0.5
invert_rotation = true
invert_endstops = true
active_braking = false
slide_offset = 1.25
lock_timeout_ms = 20
"#;
        let config = parse_config(toml).expect("full config should parse");
        assert_eq!(config.name.as_str(), "z_slide");
        assert_eq!(config.steps_per_revolution, 400);
        assert!((config.slide_units_per_rev.unwrap() - 0.008).abs() < 1e-9);
        assert!((config.max_rps.value() - 2.0).abs() < 1e-6);
        assert!(config.invert_rotation);
        assert!(config.invert_endstops);
        assert!(!config.active_braking);
        assert!((config.slide_offset.value() - 1.25).abs() < 1e-6);
        assert_eq!(config.lock_timeout_ms, 20);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let toml = r#"
[axis]
steps_per_revolution = 200
min_rps = 5.0
max_rps = 1.0
"#;
        assert!(parse_config(toml).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_config("not really toml [").is_err());
    }

    #[test]
    fn test_long_message_truncated_not_dropped() {
        let long = "x".repeat(300);
        let msg = truncate_message(&long);
        assert_eq!(msg.len(), 128);
        assert!(msg.chars().all(|c| c == 'x'));

        // Multi-byte characters are cut on a boundary, never mid-char.
        let wide = "é".repeat(200);
        let msg = truncate_message(&wide);
        assert_eq!(msg.len(), 128);
        assert!(msg.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_parse_error_keeps_message() {
        let toml = "[axis]\nsteps_per_revolution = \"two hundred\"\n";
        match parse_config(toml) {
            Err(Error::Config(ConfigError::ParseError(msg))) => {
                assert!(!msg.is_empty());
            }
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}
