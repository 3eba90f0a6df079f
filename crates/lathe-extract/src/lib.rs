#![warn(missing_docs)]

//! Surface extractors for the lathe contour builder.
//!
//! An extractor reads a part file and produces [`PartFeatures`]: the
//! part's rotation axis and one [`Feature`] per rotational surface,
//! projected onto that axis. Two implementations share the
//! [`SurfaceExtractor`] contract:
//!
//! - [`BrepExtractor`] walks the STEP B-rep topology (high fidelity).
//! - [`TextPatternExtractor`] scans the Part 21 text with regular
//!   expressions, without topology (lower fidelity, more forgiving).
//!
//! [`FallbackExtractor`] chains them; [`default_chain`] tries the B-rep
//! reader first.

mod axis;
mod brep;
mod error;
mod fallback;
mod text;

pub use brep::BrepExtractor;
pub use error::ExtractError;
pub use fallback::FallbackExtractor;
pub use text::TextPatternExtractor;

use lathe_contour::{Feature, RotationAxis};
use lathe_math::Tolerance;
use serde::{Deserialize, Serialize};

/// Output of an extractor: everything the contour builder needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartFeatures {
    /// Rotational surfaces, in file order.
    pub features: Vec<Feature>,
    /// The part's rotation axis.
    pub axis: RotationAxis,
}

/// A source of [`PartFeatures`].
pub trait SurfaceExtractor: Send + Sync {
    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;

    /// Extract features from raw file contents.
    fn extract(&self, source: &[u8]) -> Result<PartFeatures, ExtractError>;
}

/// Extraction tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractSettings {
    /// Distance tolerance in mm for coaxiality and point matching.
    pub linear_tolerance: f64,
    /// Angular tolerance in radians for parallel axes.
    pub angular_tolerance: f64,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            linear_tolerance: 1e-4,
            angular_tolerance: 1e-6,
        }
    }
}

impl ExtractSettings {
    /// As a geometric comparison tolerance.
    pub fn tolerance(&self) -> Tolerance {
        Tolerance {
            linear: self.linear_tolerance,
            angular: self.angular_tolerance,
        }
    }
}

/// B-rep first, text scan second.
pub fn default_chain(settings: ExtractSettings) -> FallbackExtractor {
    FallbackExtractor::new()
        .with(BrepExtractor::new(settings))
        .with(TextPatternExtractor::new(settings))
}

/// Look up an extractor by name: `brep`, `text`, or `auto` (the default chain).
pub fn extractor_by_name(
    name: &str,
    settings: ExtractSettings,
) -> Option<Box<dyn SurfaceExtractor>> {
    match name {
        "brep" => Some(Box::new(BrepExtractor::new(settings))),
        "text" => Some(Box::new(TextPatternExtractor::new(settings))),
        "auto" => Some(Box::new(default_chain(settings))),
        _ => None,
    }
}
