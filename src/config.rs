//! Aggregate robot configuration.
//!
//! Every section falls back to its `Default` when absent from the file, so
//! a partial TOML only overrides what it names. Unlike telemetry, a config
//! that fails to read or parse is a hard error: driving a chassis with
//! silently-defaulted geometry or gains is not safe.

use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::drive::module::SwerveModuleConfig;
use crate::drive::swerve::SwerveDriveConfig;
use crate::error::{DriveError, Result};
use crate::odometry::history::HistoryConfig;
use crate::odometry::tracker::TrackerConfig;

/// Per-corner module configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Front left wheel pod
    pub front_left: SwerveModuleConfig,
    /// Front right wheel pod
    pub front_right: SwerveModuleConfig,
    /// Rear left wheel pod
    pub rear_left: SwerveModuleConfig,
    /// Rear right wheel pod
    pub rear_right: SwerveModuleConfig,
}

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    /// Chassis geometry and input shaping
    pub drive: SwerveDriveConfig,
    /// Per-wheel mechanical parameters
    pub modules: ModulesConfig,
    /// Standalone odometry tracker
    pub tracker: TrackerConfig,
    /// Pose history sampler
    pub history: HistoryConfig,
}

impl RobotConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| DriveError::ConfigRead {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = basic_toml::from_str(&contents).map_err(|e| DriveError::ConfigParse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config: RobotConfig = basic_toml::from_str("").unwrap();
        assert_relative_eq!(config.drive.xy_multiplier, 0.85);
        assert_relative_eq!(config.drive.width_ft, 22.0 / 12.0);
        assert_eq!(config.history.capacity, 20);
        assert_eq!(config.history.sample_interval_us, 50_000);
    }

    #[test]
    fn test_partial_toml_overrides_named_fields() {
        let toml = r#"
            [drive]
            xy_multiplier = 1.0
            squared_inputs = false

            [modules.front_left]
            zero_offset = 0.42
            inverted = true

            [history]
            capacity = 10
        "#;
        let config: RobotConfig = basic_toml::from_str(toml).unwrap();
        assert_relative_eq!(config.drive.xy_multiplier, 1.0);
        assert!(!config.drive.squared_inputs);
        // Unnamed fields keep their defaults.
        assert_relative_eq!(config.drive.rotation_multiplier, 0.5);

        assert_relative_eq!(config.modules.front_left.zero_offset, 0.42);
        assert!(config.modules.front_left.inverted);
        assert!(!config.modules.front_right.inverted);

        assert_eq!(config.history.capacity, 10);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = RobotConfig::load("/nonexistent/robot.toml").unwrap_err();
        assert!(matches!(err, DriveError::ConfigRead { .. }));
    }

    #[test]
    fn test_malformed_toml_is_error() {
        let dir = std::env::temp_dir().join("chakra-drive-config-test");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("bad.toml");
        fs::write(&path, "[drive\nxy_multiplier = ").unwrap();

        let err = RobotConfig::load(&path).unwrap_err();
        assert!(matches!(err, DriveError::ConfigParse { .. }));
    }
}
