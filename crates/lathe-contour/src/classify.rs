//! Feature classification: off-axis exclusion and enclosure-based polarity.
//!
//! The extractor's polarity is only a starting guess. Two on-axis features
//! whose axial spans overlap settle it between themselves: the one with the
//! larger radius over the overlap bounds the outside of the material there,
//! the smaller one a bore. Radii come from boundary points only.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::feature::{Feature, Polarity};
use crate::settings::ContourTolerance;

/// How the final polarity was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Enclosure test decided, or the feature is off-axis.
    Resolved,
    /// No overlapping feature to compare with; extractor polarity kept.
    LowConfidence,
}

/// A feature with its corrected role. Borrows the input feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedFeature<'a> {
    /// Position in the input list.
    pub index: usize,
    /// The input feature, unchanged.
    pub feature: &'a Feature,
    /// Polarity after the enclosure test.
    pub polarity: Polarity,
    /// Secondary hole, kept out of the rotational contour.
    pub excluded_off_axis: bool,
    /// How `polarity` was decided.
    pub confidence: Confidence,
    /// `polarity` differs from the extractor's.
    pub reclassified: bool,
}

impl ClassifiedFeature<'_> {
    /// On-axis with the given polarity.
    pub fn is_traced_as(&self, polarity: Polarity) -> bool {
        !self.excluded_off_axis && self.polarity == polarity
    }
}

/// Classifier output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification<'a> {
    /// Usable features, in input order.
    pub features: Vec<ClassifiedFeature<'a>>,
    /// Features dropped as degenerate.
    pub degenerate: usize,
}

impl<'a> Classification<'a> {
    /// On-axis features with the given polarity, in input order.
    pub fn on_axis(&self, polarity: Polarity) -> Vec<&ClassifiedFeature<'a>> {
        self.features.iter().filter(|f| f.is_traced_as(polarity)).collect()
    }

    /// Features excluded as off-axis.
    pub fn off_axis_count(&self) -> usize {
        self.features.iter().filter(|f| f.excluded_off_axis).count()
    }

    /// Features whose polarity changed.
    pub fn reclassified_count(&self) -> usize {
        self.features.iter().filter(|f| f.reclassified).count()
    }

    /// Input indices of low-confidence features.
    pub fn low_confidence(&self) -> Vec<usize> {
        self.features
            .iter()
            .filter(|f| f.confidence == Confidence::LowConfidence)
            .map(|f| f.index)
            .collect()
    }
}

/// Largest boundary radius of `feature`, never its declared radius.
pub fn effective_radius(feature: &Feature) -> f64 {
    feature.effective_radius()
}

/// Largest radius of `feature` over `[lo, hi]`: the interpolated radius at
/// both ends and every own boundary point in between.
fn radius_over(feature: &Feature, lo: f64, hi: f64, tol: f64) -> f64 {
    let ends = [lo, hi]
        .into_iter()
        .filter_map(|x| feature.radius_at(x, tol));
    let inside = feature
        .boundary_points
        .iter()
        .filter(|p| p.axial >= lo && p.axial <= hi)
        .map(|p| p.radius);
    ends.chain(inside).fold(f64::NEG_INFINITY, f64::max)
}

#[derive(Debug, Default, Clone, Copy)]
struct Enclosure {
    enclosed_by: usize,
    encloses: usize,
    overlaps: usize,
}

/// Classify `features`.
///
/// Degenerate features are dropped and counted. Off-axis features are
/// excluded whatever their polarity. Every other feature is compared with
/// each on-axis feature it overlaps by a positive axial length: enclosed by
/// any of them makes it `Inner`, otherwise enclosing any makes it `Outer`.
/// A feature with no decisive overlap keeps the extractor's polarity and is
/// flagged low-confidence.
pub fn classify<'a>(features: &'a [Feature], tol: &ContourTolerance) -> Classification<'a> {
    let mut degenerate = 0;
    let mut usable: Vec<(usize, &'a Feature)> = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        if feature.is_degenerate() {
            debug!(feature = %feature.display_name(index), "dropping degenerate feature");
            degenerate += 1;
        } else {
            usable.push((index, feature));
        }
    }

    // spans and per-feature tallies, aligned with `usable`
    let spans: Vec<(f64, f64)> = usable.iter().map(|(_, f)| f.axial_span()).collect();
    let mut tallies = vec![Enclosure::default(); usable.len()];

    for i in 0..usable.len() {
        let (_, fi) = usable[i];
        if !fi.axis_alignment {
            continue;
        }
        for j in (i + 1)..usable.len() {
            let (_, fj) = usable[j];
            if !fj.axis_alignment {
                continue;
            }
            let lo = spans[i].0.max(spans[j].0);
            let hi = spans[i].1.min(spans[j].1);
            if !tol.exceeds(hi, lo) {
                continue;
            }
            let ri = radius_over(fi, lo, hi, tol.linear);
            let rj = radius_over(fj, lo, hi, tol.linear);
            tallies[i].overlaps += 1;
            tallies[j].overlaps += 1;
            if tol.exceeds(rj, ri) {
                tallies[i].enclosed_by += 1;
                tallies[j].encloses += 1;
            } else if tol.exceeds(ri, rj) {
                tallies[j].enclosed_by += 1;
                tallies[i].encloses += 1;
            }
        }
    }

    let classified = usable
        .iter()
        .zip(&tallies)
        .map(|(&(index, feature), tally)| {
            if !feature.axis_alignment {
                return ClassifiedFeature {
                    index,
                    feature,
                    polarity: feature.polarity,
                    excluded_off_axis: true,
                    confidence: Confidence::Resolved,
                    reclassified: false,
                };
            }

            let (polarity, confidence) = if tally.enclosed_by > 0 {
                (Polarity::Inner, Confidence::Resolved)
            } else if tally.encloses > 0 {
                (Polarity::Outer, Confidence::Resolved)
            } else {
                warn!(
                    feature = %feature.display_name(index),
                    overlaps = tally.overlaps,
                    polarity = ?feature.polarity,
                    "no enclosing or enclosed feature, keeping extractor polarity"
                );
                (feature.polarity, Confidence::LowConfidence)
            };

            let reclassified = polarity != feature.polarity;
            if reclassified {
                info!(
                    feature = %feature.display_name(index),
                    from = ?feature.polarity,
                    to = ?polarity,
                    effective_radius = feature.effective_radius(),
                    "reclassified feature"
                );
            }

            ClassifiedFeature {
                index,
                feature,
                polarity,
                excluded_off_axis: false,
                confidence,
                reclassified,
            }
        })
        .collect();

    Classification {
        features: classified,
        degenerate,
    }
}
