#![warn(missing_docs)]

//! Math types for the lathe contour builder.
//!
//! Thin wrappers around nalgebra providing the handful of 3D types the
//! STEP reader and the extractors need, plus the axis frame used to map
//! 3D points onto a rotational `(axial, radius)` half-plane.

use nalgebra::{Unit, Vector3};
use serde::{Deserialize, Serialize};

/// Position in model space (mm).
pub type Point3 = nalgebra::Point3<f64>;

/// Displacement in model space.
pub type Vec3 = Vector3<f64>;

/// Unit-length direction.
pub type Dir3 = Unit<Vector3<f64>>;

/// Comparison thresholds for 3D geometry read from a file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    /// Distances below this (mm) are zero.
    pub linear: f64,
    /// Angles below this (radians) are zero.
    pub angular: f64,
}

impl Tolerance {
    /// 1e-6 mm, 1e-9 rad.
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// `a` and `b` lie on parallel lines, pointing either way.
    pub fn directions_parallel(&self, a: &Dir3, b: &Dir3) -> bool {
        // |a x b| = sin of the angle between them
        a.as_ref().cross(b.as_ref()).norm() < self.angular.sin()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A rotation axis: a line through `origin` along `direction`.
///
/// Projecting a point onto the frame yields its position along the axis
/// and its distance from the axis, the two coordinates of a turned part's
/// cross-section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisFrame {
    /// A point on the axis.
    pub origin: Point3,
    /// Axis direction.
    pub direction: Dir3,
}

impl AxisFrame {
    /// Create a frame from a point and a (not necessarily normalized) direction.
    pub fn new(origin: Point3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: Dir3::new_normalize(direction),
        }
    }

    /// Frame along the global Z axis through the origin.
    pub fn z_axis() -> Self {
        Self::new(Point3::origin(), Vec3::z())
    }

    /// Signed position of `p` along the axis.
    pub fn axial(&self, p: &Point3) -> f64 {
        (p - self.origin).dot(self.direction.as_ref())
    }

    /// Distance of `p` from the axis line.
    pub fn radial(&self, p: &Point3) -> f64 {
        let d = p - self.origin;
        let along = d.dot(self.direction.as_ref());
        (d - along * self.direction.as_ref()).norm()
    }

    /// Project `p` to `(axial, radius)`.
    pub fn project(&self, p: &Point3) -> (f64, f64) {
        (self.axial(p), self.radial(p))
    }

    /// Whether `other` describes the same line within tolerance.
    ///
    /// The directions may point opposite ways.
    pub fn is_coaxial(&self, other: &AxisFrame, tol: &Tolerance) -> bool {
        tol.directions_parallel(&self.direction, &other.direction)
            && self.radial(&other.origin) < tol.linear
    }

    /// Canonical orientation: flip the direction so its largest component is positive.
    ///
    /// Two frames on the same line then agree on which way "axial" grows.
    pub fn canonical(&self) -> Self {
        let v = self.direction.as_ref();
        let dominant = if v.x.abs() >= v.y.abs() && v.x.abs() >= v.z.abs() {
            v.x
        } else if v.y.abs() >= v.z.abs() {
            v.y
        } else {
            v.z
        };
        if dominant < 0.0 {
            Self {
                origin: self.origin,
                direction: Dir3::new_unchecked(-v),
            }
        } else {
            *self
        }
    }
}
