//! Input records: one rotational surface per [`Feature`].

use serde::{Deserialize, Serialize};

/// A point in the axial half-plane: position along the rotation axis and
/// distance from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxialPoint {
    /// Position along the rotation axis (mm).
    pub axial: f64,
    /// Distance from the rotation axis (mm).
    pub radius: f64,
}

impl AxialPoint {
    /// Create a point.
    pub const fn new(axial: f64, radius: f64) -> Self {
        Self { axial, radius }
    }

    fn is_finite(&self) -> bool {
        self.axial.is_finite() && self.radius.is_finite()
    }
}

impl From<(f64, f64)> for AxialPoint {
    fn from((axial, radius): (f64, f64)) -> Self {
        Self { axial, radius }
    }
}

/// Surface type reported by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Cylinder.
    Cylindrical,
    /// Cone.
    Conical,
    /// Plane (an annular face between two radii).
    Planar,
    /// Torus (fillet or groove).
    Toroidal,
    /// Anything else.
    Other,
}

/// Which side of the material a surface bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Outside of the part.
    Outer,
    /// Bore or cavity.
    Inner,
}

/// One geometric surface, projected onto the part's rotation axis.
///
/// `boundary_points` is the only trusted geometry. `declared_radius` and
/// `semi_angle` are copied from the source file as-is; for cones the
/// declared radius is often the half-angle, so neither is ever used to
/// place or classify the feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Surface type.
    pub kind: FeatureKind,
    /// Where the surface starts and ends along the axis, in any order.
    pub boundary_points: Vec<AxialPoint>,
    /// Radius attribute as written by the extractor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_radius: Option<f64>,
    /// Cone half-angle as written by the extractor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semi_angle: Option<f64>,
    /// Whether the surface's own axis is the part's rotation axis.
    pub axis_alignment: bool,
    /// Extractor-supplied polarity.
    pub polarity: Polarity,
    /// Source reference for diagnostics, e.g. `#123`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Feature {
    /// An on-axis feature with no hints.
    pub fn new(kind: FeatureKind, polarity: Polarity, boundary_points: Vec<AxialPoint>) -> Self {
        Self {
            kind,
            boundary_points,
            declared_radius: None,
            semi_angle: None,
            axis_alignment: true,
            polarity,
            label: None,
        }
    }

    /// A cylinder of `radius` from `start` to `end`.
    pub fn cylinder(polarity: Polarity, start: f64, end: f64, radius: f64) -> Self {
        Self::new(
            FeatureKind::Cylindrical,
            polarity,
            vec![AxialPoint::new(start, radius), AxialPoint::new(end, radius)],
        )
        .with_declared_radius(radius)
    }

    /// A cone from `(x0, r0)` to `(x1, r1)`.
    pub fn cone(polarity: Polarity, (x0, r0): (f64, f64), (x1, r1): (f64, f64)) -> Self {
        Self::new(
            FeatureKind::Conical,
            polarity,
            vec![AxialPoint::new(x0, r0), AxialPoint::new(x1, r1)],
        )
    }

    /// An annular planar face at `axial`, from radius `r0` to `r1`.
    pub fn annulus(polarity: Polarity, axial: f64, r0: f64, r1: f64) -> Self {
        Self::new(
            FeatureKind::Planar,
            polarity,
            vec![AxialPoint::new(axial, r0), AxialPoint::new(axial, r1)],
        )
    }

    /// Mark the surface as not coaxial with the part (cross-hole, bolt hole).
    pub fn off_axis(mut self) -> Self {
        self.axis_alignment = false;
        self
    }

    /// Attach the extractor's radius attribute.
    pub fn with_declared_radius(mut self, radius: f64) -> Self {
        self.declared_radius = Some(radius);
        self
    }

    /// Attach the extractor's half-angle attribute.
    pub fn with_semi_angle(mut self, angle: f64) -> Self {
        self.semi_angle = Some(angle);
        self
    }

    /// Attach a source label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Fewer than two points, or any non-finite coordinate.
    pub fn is_degenerate(&self) -> bool {
        self.boundary_points.len() < 2 || !self.boundary_points.iter().all(AxialPoint::is_finite)
    }

    /// Boundary points ordered by axial position; equal positions keep input order.
    pub fn ordered_points(&self) -> Vec<AxialPoint> {
        let mut points = self.boundary_points.clone();
        points.sort_by(|a, b| a.axial.total_cmp(&b.axial));
        points
    }

    /// `(start, end)` along the axis. `(0, 0)` for a feature with no points.
    pub fn axial_span(&self) -> (f64, f64) {
        let mut iter = self.boundary_points.iter().map(|p| p.axial);
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        iter.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)))
    }

    /// Length of the axial span.
    pub fn axial_length(&self) -> f64 {
        let (start, end) = self.axial_span();
        end - start
    }

    /// Largest boundary radius. The declared radius is deliberately ignored.
    pub fn effective_radius(&self) -> f64 {
        self.boundary_points
            .iter()
            .map(|p| p.radius)
            .fold(0.0, f64::max)
    }

    /// Radius at `axial`, interpolated between the feature's own boundary points.
    ///
    /// Where several points share a position the largest radius is returned.
    /// `None` outside the span (widened by `tol`).
    pub fn radius_at(&self, axial: f64, tol: f64) -> Option<f64> {
        radius_at(&self.ordered_points(), axial, tol)
    }

    pub(crate) fn display_name(&self, index: usize) -> String {
        match &self.label {
            Some(label) => format!("{label} (feature {index})"),
            None => format!("feature {index}"),
        }
    }
}

/// Linear interpolation over axially ordered points.
pub(crate) fn radius_at(points: &[AxialPoint], axial: f64, tol: f64) -> Option<f64> {
    let first = points.first()?;
    let last = points.last()?;
    if axial < first.axial - tol || axial > last.axial + tol {
        return None;
    }
    if points.len() == 1 {
        return Some(first.radius);
    }

    let mut best: Option<f64> = None;
    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if axial < a.axial - tol || axial > b.axial + tol {
            continue;
        }
        let r = if b.axial - a.axial <= tol {
            a.radius.max(b.radius)
        } else {
            let t = ((axial - a.axial) / (b.axial - a.axial)).clamp(0.0, 1.0);
            a.radius + t * (b.radius - a.radius)
        };
        best = Some(best.map_or(r, |m| m.max(r)));
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_effective_radius_ignores_declared_radius() {
        // cone whose radius field carries its half-angle
        let cone =
            Feature::cone(Polarity::Outer, (0.0, 10.0), (5.0, 6.0)).with_declared_radius(1.23);
        assert_relative_eq!(cone.effective_radius(), 10.0);
    }

    #[test]
    fn test_axial_span_of_unordered_points() {
        let f = Feature::new(
            FeatureKind::Other,
            Polarity::Outer,
            vec![(7.0, 1.0).into(), (-2.0, 1.0).into(), (3.0, 2.0).into()],
        );
        assert_eq!(f.axial_span(), (-2.0, 7.0));
        assert_relative_eq!(f.axial_length(), 9.0);
        let xs: Vec<f64> = f.ordered_points().iter().map(|p| p.axial).collect();
        assert_eq!(xs, vec![-2.0, 3.0, 7.0]);
    }

    #[test]
    fn test_ordered_points_stable_at_equal_positions() {
        let f = Feature::annulus(Polarity::Outer, 4.0, 9.0, 3.0);
        let rs: Vec<f64> = f.ordered_points().iter().map(|p| p.radius).collect();
        assert_eq!(rs, vec![9.0, 3.0]);
    }

    #[test]
    fn test_radius_at_interpolates() {
        let cone = Feature::cone(Polarity::Outer, (0.0, 4.0), (10.0, 6.0));
        assert_relative_eq!(cone.radius_at(5.0, 1e-9).unwrap(), 5.0);
        assert_relative_eq!(cone.radius_at(10.0, 1e-9).unwrap(), 6.0);
        assert!(cone.radius_at(10.5, 1e-9).is_none());
        assert!(cone.radius_at(-0.5, 1e-9).is_none());
    }

    #[test]
    fn test_radius_at_step_takes_larger_side() {
        let stepped = Feature::new(
            FeatureKind::Other,
            Polarity::Outer,
            vec![(0.0, 8.0).into(), (5.0, 8.0).into(), (5.0, 3.0).into(), (9.0, 3.0).into()],
        );
        assert_relative_eq!(stepped.radius_at(5.0, 1e-9).unwrap(), 8.0);
        assert_relative_eq!(stepped.radius_at(7.0, 1e-9).unwrap(), 3.0);
    }

    #[test]
    fn test_degenerate() {
        let single = Feature::new(FeatureKind::Planar, Polarity::Outer, vec![(0.0, 1.0).into()]);
        assert!(single.is_degenerate());
        assert!(Feature::cylinder(Polarity::Outer, 0.0, f64::NAN, 2.0).is_degenerate());
        assert!(!Feature::cylinder(Polarity::Outer, 0.0, 1.0, 2.0).is_degenerate());
    }

    #[test]
    fn test_serde_shape() {
        let f = Feature::cylinder(Polarity::Inner, 0.0, 12.0, 4.1).with_label("#42");
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["kind"], "cylindrical");
        assert_eq!(json["polarity"], "inner");
        assert_eq!(json["label"], "#42");
        assert!(json.get("semi_angle").is_none());
        let back: Feature = serde_json::from_value(json).unwrap();
        assert_eq!(back, f);
    }
}
