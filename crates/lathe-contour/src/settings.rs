//! Tolerances and build settings.

use serde::{Deserialize, Serialize};

use crate::error::{ContourError, Result};

/// Comparison tolerance in the axial half-plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourTolerance {
    /// Linear tolerance in mm, applied to both axial positions and radii.
    pub linear: f64,
}

impl ContourTolerance {
    /// 1e-6 mm.
    pub const DEFAULT: Self = Self { linear: 1e-6 };

    /// Tolerance with the given linear value.
    pub const fn new(linear: f64) -> Self {
        Self { linear }
    }

    /// `a` and `b` are within tolerance of each other.
    pub fn within(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.linear
    }

    /// `a` exceeds `b` by more than the tolerance.
    pub fn exceeds(&self, a: f64, b: f64) -> bool {
        a - b > self.linear
    }
}

impl Default for ContourTolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Settings for [`build_contour_with`](crate::build_contour_with).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourSettings {
    /// Comparison tolerance.
    pub tolerance: ContourTolerance,
}

impl ContourSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        let linear = self.tolerance.linear;
        if !linear.is_finite() || linear < 0.0 {
            return Err(ContourError::InvalidSettings(format!(
                "linear tolerance must be a non-negative number, got {linear}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        assert!(ContourSettings::default().validate().is_ok());
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let settings = ContourSettings {
            tolerance: ContourTolerance::new(-1.0),
        };
        assert!(matches!(settings.validate(), Err(ContourError::InvalidSettings(_))));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let settings: ContourSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, ContourSettings::default());
        let settings: ContourSettings =
            serde_json::from_str(r#"{"tolerance":{"linear":0.001}}"#).unwrap();
        assert_eq!(settings.tolerance.linear, 0.001);
    }

    #[test]
    fn test_comparisons() {
        let tol = ContourTolerance::new(0.01);
        assert!(tol.within(1.0, 1.005));
        assert!(!tol.exceeds(1.005, 1.0));
        assert!(tol.exceeds(1.02, 1.0));
    }
}
