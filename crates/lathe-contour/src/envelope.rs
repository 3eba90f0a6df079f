//! Overlap resolution for inner features.
//!
//! Concentric bores often share an axial range (a counterbore over a
//! through hole, or the same bore reported by several faces). The bore
//! that bounds the material is the widest one, so the governing inner
//! boundary is the pointwise maximum of every covering feature's radius.

use tracing::debug;

use crate::classify::ClassifiedFeature;
use crate::contour::{Polyline, PolylineBuilder};
use crate::feature::{AxialPoint, Feature};
use crate::settings::ContourTolerance;

/// Radius of `feature` at `axial`, interpolated between its own boundary
/// points. `None` outside its span.
pub fn interpolate_radius(feature: &Feature, axial: f64, tol: &ContourTolerance) -> Option<f64> {
    feature.radius_at(axial, tol.linear)
}

struct Candidate<'c, 'a> {
    feature: &'c ClassifiedFeature<'a>,
    points: Vec<AxialPoint>,
    start: f64,
    end: f64,
}

impl Candidate<'_, '_> {
    fn covers(&self, lo: f64, hi: f64, tol: &ContourTolerance) -> bool {
        self.start <= lo + tol.linear && self.end >= hi - tol.linear
    }

    fn radius(&self, axial: f64, tol: &ContourTolerance) -> f64 {
        crate::feature::radius_at(&self.points, axial, tol.linear).unwrap_or(f64::NEG_INFINITY)
    }

    /// Own boundary points at `axial`, in walk order.
    fn own_points_at(&self, axial: f64, tol: &ContourTolerance) -> Vec<AxialPoint> {
        self.points
            .iter()
            .copied()
            .filter(|p| tol.within(p.axial, axial))
            .collect()
    }
}

/// Sort and merge positions closer than the tolerance, keeping the first of each cluster.
fn merge_positions(mut xs: Vec<f64>, tol: &ContourTolerance) -> Vec<f64> {
    xs.sort_by(f64::total_cmp);
    let mut out: Vec<f64> = Vec::with_capacity(xs.len());
    for x in xs {
        if out.last().map_or(true, |&last| !tol.within(x, last)) {
            out.push(x);
        }
    }
    out
}

/// Add the positions where two covering features cross strictly inside an interval.
fn crossings(candidates: &[Candidate<'_, '_>], breaks: &[f64], tol: &ContourTolerance) -> Vec<f64> {
    let mut out = Vec::new();
    for w in breaks.windows(2) {
        let (lo, hi) = (w[0], w[1]);
        let covering: Vec<&Candidate<'_, '_>> =
            candidates.iter().filter(|c| c.covers(lo, hi, tol)).collect();
        for (i, a) in covering.iter().enumerate() {
            for b in &covering[i + 1..] {
                let d_lo = a.radius(lo, tol) - b.radius(lo, tol);
                let d_hi = a.radius(hi, tol) - b.radius(hi, tol);
                let apart = d_lo.abs() > tol.linear && d_hi.abs() > tol.linear;
                if apart && d_lo.signum() != d_hi.signum() {
                    out.push(lo + (hi - lo) * d_lo / (d_lo - d_hi));
                }
            }
        }
    }
    out
}

/// The governing feature over `[lo, hi]`: largest radius at the midpoint,
/// then longer span, then lower input index.
fn winner(
    candidates: &[Candidate<'_, '_>],
    lo: f64,
    hi: f64,
    tol: &ContourTolerance,
) -> Option<usize> {
    let mid = 0.5 * (lo + hi);
    let mut best: Option<(usize, f64)> = None;
    for (i, c) in candidates.iter().enumerate() {
        if !c.covers(lo, hi, tol) {
            continue;
        }
        let r = c.radius(mid, tol);
        let better = match best {
            None => true,
            Some((b, br)) => {
                let current = &candidates[b];
                if tol.exceeds(r, br) {
                    true
                } else if tol.within(r, br) {
                    let (len, best_len) = (c.end - c.start, current.end - current.start);
                    tol.exceeds(len, best_len)
                        || (tol.within(len, best_len) && c.feature.index < current.feature.index)
                } else {
                    false
                }
            }
        };
        if better {
            best = Some((i, r));
        }
    }
    best.map(|(i, _)| i)
}

/// Value of a candidate at `axial`: its own points there if it has any,
/// otherwise the interpolated radius.
fn points_at(c: &Candidate<'_, '_>, axial: f64, tol: &ContourTolerance) -> Vec<AxialPoint> {
    let own = c.own_points_at(axial, tol);
    if own.is_empty() {
        vec![AxialPoint::new(axial, c.radius(axial, tol))]
    } else {
        own
    }
}

/// Resolve overlapping inner features into their envelope.
///
/// Returns one polyline per contiguous covered axial region. Zero-length
/// features cover nothing and are ignored.
pub fn resolve_envelope(
    features: &[&ClassifiedFeature<'_>],
    tol: &ContourTolerance,
) -> Vec<Polyline> {
    let candidates: Vec<Candidate<'_, '_>> = features
        .iter()
        .filter(|cf| tol.exceeds(cf.feature.axial_length(), 0.0))
        .map(|cf| {
            let (start, end) = cf.feature.axial_span();
            Candidate {
                feature: *cf,
                points: cf.feature.ordered_points(),
                start,
                end,
            }
        })
        .collect();
    if candidates.is_empty() {
        return Vec::new();
    }

    let positions: Vec<f64> = candidates
        .iter()
        .flat_map(|c| c.points.iter().map(|p| p.axial))
        .collect();
    let mut breaks = merge_positions(positions, tol);
    let cross = crossings(&candidates, &breaks, tol);
    if !cross.is_empty() {
        debug!(count = cross.len(), "adding crossing breakpoints");
        breaks.extend(cross);
        breaks = merge_positions(breaks, tol);
    }

    let mut polylines = Vec::new();
    let mut line = PolylineBuilder::new(*tol);
    // (candidate, end of its last interval)
    let mut previous: Option<(usize, f64)> = None;

    for pair in breaks.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        match (winner(&candidates, lo, hi, tol), previous) {
            (None, Some((p, end))) => {
                line.extend(points_at(&candidates[p], end, tol));
                polylines.push(std::mem::replace(&mut line, PolylineBuilder::new(*tol)).finish());
                previous = None;
            }
            (None, None) => {}
            (Some(w), None) => {
                line.extend(points_at(&candidates[w], lo, tol));
                previous = Some((w, hi));
            }
            (Some(w), Some((p, _))) if w == p => {
                line.extend(candidates[w].own_points_at(lo, tol));
                previous = Some((w, hi));
            }
            (Some(w), Some((p, _))) => {
                // leave the previous winner from its left side, enter the new one on its right
                if let Some(first) = points_at(&candidates[p], lo, tol).first() {
                    line.push(*first);
                }
                if let Some(last) = points_at(&candidates[w], lo, tol).last() {
                    line.push(*last);
                }
                previous = Some((w, hi));
            }
        }
    }
    if let Some((p, end)) = previous {
        line.extend(points_at(&candidates[p], end, tol));
    }
    if !line.is_empty() {
        polylines.push(line.finish());
    }
    polylines
}
