#![warn(missing_docs)]

//! Deterministic rotational contour builder.
//!
//! Turns the surfaces of a turned part, projected onto its rotation axis,
//! into a 2D cross-section: one outer profile, zero or more bore profiles,
//! and a count of off-axis holes.
//!
//! The pipeline is pure and synchronous:
//!
//! 1. [`classify`] drops degenerate features, excludes off-axis ones, and
//!    corrects outer/inner polarity by enclosure.
//! 2. [`trace`] walks the outer features into one step-preserving polyline.
//! 3. [`resolve_envelope`] reduces overlapping inner features to their
//!    widest boundary.
//! 4. [`build_contour`] runs the three and clips bores to the outer span.
//!
//! # Example
//!
//! ```
//! use lathe_contour::{build_contour, AxisId, Feature, Polarity, RotationAxis};
//!
//! let features = vec![
//!     Feature::cylinder(Polarity::Outer, 0.0, 11.0, 8.0),
//!     Feature::cylinder(Polarity::Outer, 11.0, 24.0, 4.5),
//!     Feature::cylinder(Polarity::Inner, 0.0, 24.0, 2.0),
//! ];
//! let contour = build_contour(&features, RotationAxis::Rotational(AxisId::Z)).unwrap();
//! assert_eq!(contour.outer.len(), 4);
//! assert_eq!(contour.inner.len(), 1);
//! ```

pub mod assemble;
pub mod classify;
pub mod contour;
pub mod envelope;
pub mod error;
pub mod feature;
pub mod settings;
pub mod trace;

pub use assemble::{build_contour, build_contour_with};
pub use classify::{classify, effective_radius, Classification, ClassifiedFeature, Confidence};
pub use contour::{AxisId, BuildSummary, Contour, Polyline, RotationAxis};
pub use envelope::{interpolate_radius, resolve_envelope};
pub use error::{ContourError, Result};
pub use feature::{AxialPoint, Feature, FeatureKind, Polarity};
pub use settings::{ContourSettings, ContourTolerance};
pub use trace::{trace, Trace};
