//! Sequential axial tracing of same-role features.
//!
//! Features are walked in axial order and their boundary points appended
//! as they come. The accumulated polyline is never re-sorted: sorting by
//! `(position, radius)` turns a step where three features meet into a
//! zig-zag.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::classify::ClassifiedFeature;
use crate::contour::{Polyline, PolylineBuilder};
use crate::error::{ContourError, Result};
use crate::feature::AxialPoint;
use crate::settings::ContourTolerance;

/// Walk order: start, then end, then input index.
pub(crate) fn walk_order(a: &ClassifiedFeature<'_>, b: &ClassifiedFeature<'_>) -> Ordering {
    let (a_start, a_end) = a.feature.axial_span();
    let (b_start, b_end) = b.feature.axial_span();
    a_start
        .total_cmp(&b_start)
        .then(a_end.total_cmp(&b_end))
        .then(a.index.cmp(&b.index))
}

/// Order a zero-length feature's points so the walk leaves from the radius
/// nearest to where it currently stands.
fn orient_step(mut points: Vec<AxialPoint>, running: Option<AxialPoint>) -> Vec<AxialPoint> {
    points.sort_by(|a, b| a.radius.total_cmp(&b.radius));
    if let (Some(end), Some(low), Some(high)) = (running, points.first(), points.last()) {
        if (high.radius - end.radius).abs() < (low.radius - end.radius).abs() {
            points.reverse();
        }
    }
    points
}

/// A traced polyline and the features that contributed nothing to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub line: Polyline,
    /// Input indices of features lying inside the span already traced.
    pub skipped: Vec<usize>,
}

/// Trace `features` into one polyline.
///
/// Fails with [`ContourError::DisconnectedTrace`] when a feature starts
/// past the traced end by more than the tolerance. A feature that starts
/// before the traced end is clipped there; one lying entirely inside the
/// traced span is skipped and reported in [`Trace::skipped`].
pub fn trace(features: &[&ClassifiedFeature<'_>], tol: &ContourTolerance) -> Result<Trace> {
    let mut order = features.to_vec();
    order.sort_by(|a, b| walk_order(a, b));

    let mut line = PolylineBuilder::new(*tol);
    let mut skipped = Vec::new();
    for cf in order {
        let feature = cf.feature;
        let (start, end) = feature.axial_span();
        let points = feature.ordered_points();

        let Some(running) = line.last() else {
            if tol.within(start, end) {
                line.extend(orient_step(points, None));
            } else {
                line.extend(points);
            }
            continue;
        };

        if tol.exceeds(start, running.axial) {
            return Err(ContourError::DisconnectedTrace {
                gap_start: running.axial,
                gap_end: start,
            });
        }

        if tol.exceeds(running.axial, start) {
            if !tol.exceeds(end, running.axial) {
                warn!(
                    feature = %feature.display_name(cf.index),
                    "skipping feature inside traced span"
                );
                skipped.push(cf.index);
                continue;
            }
            let Some(resume) = feature.radius_at(running.axial, tol.linear) else {
                warn!(
                    feature = %feature.display_name(cf.index),
                    at = running.axial,
                    "no radius at traced end, skipping feature"
                );
                skipped.push(cf.index);
                continue;
            };
            debug!(
                feature = %feature.display_name(cf.index),
                at = running.axial,
                radius = resume,
                "clipping overlapping feature"
            );
            line.push(AxialPoint::new(running.axial, resume));
            line.extend(points.into_iter().filter(|p| tol.exceeds(p.axial, running.axial)));
            continue;
        }

        if tol.within(start, end) {
            line.extend(orient_step(points, Some(running)));
        } else {
            line.extend(points);
        }
    }

    Ok(Trace {
        line: line.finish(),
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::feature::{Feature, Polarity};

    const TOL: ContourTolerance = ContourTolerance::DEFAULT;

    fn trace_all(features: &[Feature]) -> Result<Polyline> {
        let c = classify(features, &TOL);
        let refs: Vec<&ClassifiedFeature<'_>> = c.features.iter().collect();
        trace(&refs, &TOL).map(|t| t.line)
    }

    fn pts(line: &Polyline) -> Vec<(f64, f64)> {
        line.points().iter().map(|p| (p.axial, p.radius)).collect()
    }

    #[test]
    fn test_step_is_preserved() {
        let features = vec![
            Feature::cylinder(Polarity::Outer, 11.0, 24.0, 4.5),
            Feature::cylinder(Polarity::Outer, 0.0, 11.0, 8.0),
        ];
        let line = trace_all(&features).unwrap();
        assert_eq!(pts(&line), vec![(0.0, 8.0), (11.0, 8.0), (11.0, 4.5), (24.0, 4.5)]);
    }

    #[test]
    fn test_three_features_meeting_do_not_zigzag() {
        // shoulder face split in two, between two cylinders
        let features = vec![
            Feature::cylinder(Polarity::Outer, 0.0, 11.0, 8.0),
            Feature::annulus(Polarity::Outer, 11.0, 6.0, 8.0),
            Feature::annulus(Polarity::Outer, 11.0, 4.5, 6.0),
            Feature::cylinder(Polarity::Outer, 11.0, 24.0, 4.5),
        ];
        let line = trace_all(&features).unwrap();
        assert_eq!(pts(&line), vec![(0.0, 8.0), (11.0, 8.0), (11.0, 4.5), (24.0, 4.5)]);
        assert_eq!(line.max_points_at_same_position(&TOL), 2);
    }

    #[test]
    fn test_gap_is_disconnected() {
        let features = vec![
            Feature::cylinder(Polarity::Outer, 0.0, 10.0, 5.0),
            Feature::cylinder(Polarity::Outer, 12.0, 20.0, 5.0),
        ];
        assert_eq!(
            trace_all(&features),
            Err(ContourError::DisconnectedTrace {
                gap_start: 10.0,
                gap_end: 12.0
            })
        );
    }

    #[test]
    fn test_contained_duplicate_is_skipped() {
        let features = vec![
            Feature::cylinder(Polarity::Outer, 0.0, 10.0, 5.0),
            Feature::cylinder(Polarity::Outer, 0.0, 10.0, 5.0),
            Feature::cylinder(Polarity::Outer, 10.0, 15.0, 3.0),
        ];
        let c = classify(&features, &TOL);
        let refs: Vec<&ClassifiedFeature<'_>> = c.features.iter().collect();
        let traced = trace(&refs, &TOL).unwrap();
        assert_eq!(
            pts(&traced.line),
            vec![(0.0, 5.0), (10.0, 5.0), (10.0, 3.0), (15.0, 3.0)]
        );
        assert_eq!(traced.skipped, vec![1]);
    }

    #[test]
    fn test_partial_overlap_resumes_at_running_end() {
        let features = vec![
            Feature::cylinder(Polarity::Outer, 0.0, 10.0, 5.0),
            Feature::cone(Polarity::Outer, (8.0, 5.0), (16.0, 1.0)),
        ];
        let line = trace_all(&features).unwrap();
        assert_eq!(pts(&line), vec![(0.0, 5.0), (10.0, 5.0), (10.0, 4.0), (16.0, 1.0)]);
    }

    #[test]
    fn test_step_face_oriented_toward_running_end() {
        // annulus listed outer-radius-last
        let features = vec![
            Feature::cylinder(Polarity::Outer, 0.0, 5.0, 9.0),
            Feature::annulus(Polarity::Outer, 5.0, 2.0, 9.0),
            Feature::cylinder(Polarity::Outer, 5.0, 7.0, 2.0),
        ];
        let line = trace_all(&features).unwrap();
        assert_eq!(pts(&line), vec![(0.0, 9.0), (5.0, 9.0), (5.0, 2.0), (7.0, 2.0)]);
    }

    #[test]
    fn test_empty_input_is_empty_polyline() {
        assert!(trace(&[], &TOL).unwrap().line.is_empty());
    }

    #[test]
    fn test_gap_within_tolerance_is_connected() {
        let tol = ContourTolerance::new(0.01);
        let features = vec![
            Feature::cylinder(Polarity::Outer, 0.0, 10.0, 5.0),
            Feature::cylinder(Polarity::Outer, 10.005, 20.0, 5.0),
        ];
        let c = classify(&features, &tol);
        let refs: Vec<_> = c.features.iter().collect();
        let line = trace(&refs, &tol).unwrap().line;
        assert_eq!(line.len(), 3);
        assert!(line.is_axially_ordered(&tol));
    }
}
