//! Output records: polylines, the assembled contour, and its diagnostics.

use serde::{Deserialize, Serialize};

use crate::feature::{radius_at, AxialPoint};
use crate::settings::ContourTolerance;

/// An axially ordered sequence of `(axial, radius)` points.
///
/// Positions never decrease. Two points share a position only at a step
/// (a sharp diameter change).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline(Vec<AxialPoint>);

impl Polyline {
    /// Wrap points that are already in walk order.
    pub fn new(points: Vec<AxialPoint>) -> Self {
        Self(points)
    }

    /// The points.
    pub fn points(&self) -> &[AxialPoint] {
        &self.0
    }

    /// Take the points.
    pub fn into_points(self) -> Vec<AxialPoint> {
        self.0
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the polyline has no points.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `(first, last)` axial position.
    pub fn axial_span(&self) -> Option<(f64, f64)> {
        Some((self.0.first()?.axial, self.0.last()?.axial))
    }

    /// Radius at `axial`, the larger side at a step.
    pub fn radius_at(&self, axial: f64) -> Option<f64> {
        radius_at(&self.0, axial, 0.0)
    }

    /// No point lies before its predecessor (beyond `tol`).
    pub fn is_axially_ordered(&self, tol: &ContourTolerance) -> bool {
        self.0.windows(2).all(|w| w[1].axial >= w[0].axial - tol.linear)
    }

    /// Longest run of consecutive points at one axial position.
    pub fn max_points_at_same_position(&self, tol: &ContourTolerance) -> usize {
        let mut best = 0;
        let mut run = 0;
        let mut anchor = f64::NAN;
        for p in &self.0 {
            if run > 0 && tol.within(p.axial, anchor) {
                run += 1;
            } else {
                anchor = p.axial;
                run = 1;
            }
            best = best.max(run);
        }
        best
    }
}

/// Accumulates points in walk order with the step-preserving rules shared
/// by the tracer and the envelope.
#[derive(Debug)]
pub(crate) struct PolylineBuilder {
    points: Vec<AxialPoint>,
    tol: ContourTolerance,
}

impl PolylineBuilder {
    pub(crate) fn new(tol: ContourTolerance) -> Self {
        Self {
            points: Vec::new(),
            tol,
        }
    }

    pub(crate) fn last(&self) -> Option<AxialPoint> {
        self.points.last().copied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append `p` unless it coincides with the current end.
    pub(crate) fn push(&mut self, p: AxialPoint) {
        if let Some(last) = self.last() {
            if self.tol.within(last.axial, p.axial) && self.tol.within(last.radius, p.radius) {
                return;
            }
        }
        self.points.push(p);
    }

    pub(crate) fn extend(&mut self, points: impl IntoIterator<Item = AxialPoint>) {
        for p in points {
            self.push(p);
        }
    }

    /// Collapse runs of three or more points at one position to their first
    /// and last point, then return the polyline.
    pub(crate) fn finish(self) -> Polyline {
        let tol = self.tol;
        let mut out: Vec<AxialPoint> = Vec::with_capacity(self.points.len());
        let mut i = 0;
        while i < self.points.len() {
            let anchor = self.points[i].axial;
            let mut j = i + 1;
            while j < self.points.len() && tol.within(self.points[j].axial, anchor) {
                j += 1;
            }
            let first = self.points[i];
            let last = self.points[j - 1];
            out.push(first);
            if j - i > 1 && !tol.within(first.radius, last.radius) {
                out.push(last);
            }
            i = j;
        }
        Polyline(out)
    }
}

/// Cardinal or custom rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisId {
    /// Global X.
    X,
    /// Global Y.
    Y,
    /// Global Z.
    Z,
    /// Any other direction.
    Custom,
}

/// The part's rotation axis, or an explicit marker that it has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationAxis {
    /// Turned part around this axis.
    Rotational(AxisId),
    /// No rotation axis (milled block, sheet part).
    Prismatic,
}

impl RotationAxis {
    /// Whether the part has a rotation axis.
    pub fn is_rotational(&self) -> bool {
        matches!(self, RotationAxis::Rotational(_))
    }
}

/// Classification and tracing counts for one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSummary {
    /// On-axis outer features handed to the tracer.
    pub outer_traced: usize,
    /// Input indices of outer features the tracer skipped as already covered.
    #[serde(default)]
    pub outer_skipped: Vec<usize>,
    /// On-axis inner features handed to the envelope.
    pub inner_traced: usize,
    /// Features excluded as off-axis.
    pub excluded_off_axis: usize,
    /// Holes reported in the contour.
    pub holes_reported: usize,
    /// Features dropped for having fewer than two usable points.
    pub degenerate_dropped: usize,
    /// Features whose polarity the classifier changed.
    pub reclassified: usize,
    /// Input indices of features kept at extractor polarity without evidence.
    pub low_confidence: Vec<usize>,
    /// Inner polylines shortened or dropped to fit the outer span.
    pub clipped_inner: usize,
}

/// The rotational cross-section of one part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    /// Outer profile.
    pub outer: Polyline,
    /// Bores, each inside the outer polyline's axial span.
    pub inner: Vec<Polyline>,
    /// Off-axis features reported but not traced.
    pub hole_count: usize,
    /// Diagnostics.
    pub summary: BuildSummary,
}
