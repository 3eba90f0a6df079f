//! Contour assembly: classifier, tracer and envelope in one pass.

use tracing::{info, instrument, warn};

use crate::classify::classify;
use crate::contour::{BuildSummary, Contour, Polyline, PolylineBuilder, RotationAxis};
use crate::envelope::resolve_envelope;
use crate::error::{ContourError, Result};
use crate::feature::{AxialPoint, Feature, Polarity};
use crate::settings::{ContourSettings, ContourTolerance};
use crate::trace::trace;

/// Build the contour of one part with default settings.
pub fn build_contour(features: &[Feature], axis: RotationAxis) -> Result<Contour> {
    build_contour_with(features, axis, &ContourSettings::default())
}

/// Build the contour of one part.
///
/// Prismatic parts, and rotational parts without any on-axis outer
/// surface, fail with [`ContourError::EmptyOuterContour`]. That is an
/// expected outcome ([`ContourError::is_expected`]).
#[instrument(skip(features, settings), fields(feature_count = features.len()))]
pub fn build_contour_with(
    features: &[Feature],
    axis: RotationAxis,
    settings: &ContourSettings,
) -> Result<Contour> {
    settings.validate()?;
    let tol = settings.tolerance;

    if !axis.is_rotational() {
        let off_axis = features
            .iter()
            .filter(|f| !f.is_degenerate() && !f.axis_alignment)
            .count();
        info!(off_axis, "part has no rotation axis");
        return Err(ContourError::EmptyOuterContour {
            hole_count: off_axis,
            excluded_off_axis: off_axis,
        });
    }

    let classification = classify(features, &tol);
    let outer_features = classification.on_axis(Polarity::Outer);
    let inner_features = classification.on_axis(Polarity::Inner);
    let excluded_off_axis = classification.off_axis_count();
    let hole_count = excluded_off_axis;

    let traced = trace(&outer_features, &tol)?;
    let outer = traced.line;
    if outer.is_empty() {
        return Err(ContourError::EmptyOuterContour {
            hole_count,
            excluded_off_axis,
        });
    }

    let mut inner = Vec::new();
    let mut clipped_inner = 0;
    if let Some((lo, hi)) = outer.axial_span() {
        for line in resolve_envelope(&inner_features, &tol) {
            match clip_to_span(&line, lo, hi, &tol) {
                Some(clipped) if clipped == line => inner.push(line),
                Some(clipped) => {
                    clipped_inner += 1;
                    warn!(lo, hi, "inner polyline extends past the outer contour, clipped");
                    inner.push(clipped);
                }
                None => {
                    clipped_inner += 1;
                    warn!(lo, hi, "inner polyline lies outside the outer contour, dropped");
                }
            }
        }
    }

    let summary = BuildSummary {
        outer_traced: outer_features.len(),
        outer_skipped: traced.skipped,
        inner_traced: inner_features.len(),
        excluded_off_axis,
        holes_reported: hole_count,
        degenerate_dropped: classification.degenerate,
        reclassified: classification.reclassified_count(),
        low_confidence: classification.low_confidence(),
        clipped_inner,
    };
    info!(
        outer_points = outer.len(),
        inner_polylines = inner.len(),
        holes = hole_count,
        skipped = summary.outer_skipped.len(),
        reclassified = summary.reclassified,
        low_confidence = summary.low_confidence.len(),
        "contour built"
    );

    Ok(Contour {
        outer,
        inner,
        hole_count,
        summary,
    })
}

/// Restrict `line` to `[lo, hi]`, interpolating at the cuts.
/// `None` when fewer than two points remain.
fn clip_to_span(line: &Polyline, lo: f64, hi: f64, tol: &ContourTolerance) -> Option<Polyline> {
    let points = line.points();
    let inside = |x: f64| x >= lo - tol.linear && x <= hi + tol.linear;
    if points.iter().all(|p| inside(p.axial)) {
        return Some(line.clone());
    }

    let cut = |a: AxialPoint, b: AxialPoint, x: f64| {
        let t = (x - a.axial) / (b.axial - a.axial);
        AxialPoint::new(x, a.radius + t * (b.radius - a.radius))
    };

    let mut out = PolylineBuilder::new(*tol);
    for (i, &p) in points.iter().enumerate() {
        if i > 0 {
            let q = points[i - 1];
            if q.axial < lo - tol.linear && p.axial > lo + tol.linear {
                out.push(cut(q, p, lo));
            }
            if q.axial < hi - tol.linear && p.axial > hi + tol.linear {
                out.push(cut(q, p, hi));
            }
        }
        if inside(p.axial) {
            out.push(p);
        }
    }
    let clipped = out.finish();
    (clipped.len() >= 2).then_some(clipped)
}
