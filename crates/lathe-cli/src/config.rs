//! `lathe.toml` configuration.
//!
//! ```toml
//! [contour.tolerance]
//! linear = 1e-6
//!
//! [extract]
//! linear_tolerance = 1e-4
//! angular_tolerance = 1e-6
//! ```

use std::fs;
use std::path::Path;

use anyhow::{ensure, Context, Result};
use lathe_contour::ContourSettings;
use lathe_extract::ExtractSettings;
use serde::{Deserialize, Serialize};

/// Config file picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "lathe.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub contour: ContourSettings,
    pub extract: ExtractSettings,
}

impl Config {
    /// Load `path`, or `lathe.toml` if present, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::default()),
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in config {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("parsing TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.contour.validate()?;
        let ExtractSettings {
            linear_tolerance,
            angular_tolerance,
        } = self.extract;
        ensure!(
            linear_tolerance.is_finite() && linear_tolerance >= 0.0,
            "extract.linear_tolerance must be a non-negative number, got {linear_tolerance}"
        );
        ensure!(
            angular_tolerance.is_finite() && angular_tolerance >= 0.0,
            "extract.angular_tolerance must be a non-negative number, got {angular_tolerance}"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_tables() {
        let text = "[contour.tolerance]\nlinear = 0.001\n\n[extract]\nlinear_tolerance = 0.01\n";
        let config = Config::from_toml(text).unwrap();
        assert_eq!(config.contour.tolerance.linear, 0.001);
        assert_eq!(config.extract.linear_tolerance, 0.01);
        assert_eq!(
            config.extract.angular_tolerance,
            ExtractSettings::default().angular_tolerance
        );
    }

    #[test]
    fn test_rejects_negative_tolerance() {
        assert!(Config::from_toml("[contour.tolerance]\nlinear = -1.0\n").is_err());
        assert!(Config::from_toml("[extract]\nangular_tolerance = -0.5\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_table() {
        assert!(Config::from_toml("[slicer]\nlayer_height = 0.2\n").is_err());
    }
}
