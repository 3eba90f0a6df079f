//! Error types for contour building.

use thiserror::Error;

/// Errors that can occur while building a contour.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContourError {
    /// Same-role features do not form one contiguous axial path.
    #[error("trace is disconnected between axial positions {gap_start} and {gap_end}")]
    DisconnectedTrace {
        /// Where the traced path ends.
        gap_start: f64,
        /// Where the next feature starts.
        gap_end: f64,
    },

    /// No on-axis outer surface survived classification. Expected for
    /// prismatic parts.
    #[error(
        "no rotational outer contour ({excluded_off_axis} off-axis features, {hole_count} holes)"
    )]
    EmptyOuterContour {
        /// Off-axis features reported as holes.
        hole_count: usize,
        /// Features excluded from the rotational contour.
        excluded_off_axis: usize,
    },

    /// Invalid build settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

impl ContourError {
    /// Whether this is a normal outcome for some parts rather than bad input.
    pub fn is_expected(&self) -> bool {
        matches!(self, ContourError::EmptyOuterContour { .. })
    }
}

/// Result type for contour operations.
pub type Result<T> = std::result::Result<T, ContourError>;
