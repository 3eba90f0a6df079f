//! High-fidelity extractor over the STEP B-rep topology.

use lathe_contour::{Feature, RotationAxis};
use lathe_step::{read_faces_from_buffer, FaceGeometry, StepSurface};
use tracing::{debug, info, instrument};

use crate::axis::{axis_id, choose_axis, feature_kind, polarity, Projector};
use crate::{ExtractError, ExtractSettings, PartFeatures, SurfaceExtractor};

/// Reads faces through [`lathe_step`] and projects each non-planar face's
/// vertices and circular edges onto the dominant rotation axis.
#[derive(Debug, Clone, Default)]
pub struct BrepExtractor {
    settings: ExtractSettings,
}

impl BrepExtractor {
    /// Create an extractor with the given tolerances.
    pub fn new(settings: ExtractSettings) -> Self {
        Self { settings }
    }
}

impl SurfaceExtractor for BrepExtractor {
    fn name(&self) -> &'static str {
        "brep"
    }

    #[instrument(skip_all, fields(extractor = "brep", bytes = source.len()))]
    fn extract(&self, source: &[u8]) -> Result<PartFeatures, ExtractError> {
        let faces = read_faces_from_buffer(source)?;
        if faces.is_empty() {
            return Err(ExtractError::NoSurfaces);
        }
        let tol = self.settings.tolerance();

        let candidates = faces.iter().filter_map(|f| {
            let axis = f.surface.axis()?;
            Some((axis, f.surface.radius().unwrap_or(0.0)))
        });
        let Some(frame) = choose_axis(candidates, &tol) else {
            info!(faces = faces.len(), "no surface of revolution, part is prismatic");
            return Ok(PartFeatures {
                features: Vec::new(),
                axis: RotationAxis::Prismatic,
            });
        };

        let projector = Projector::new(frame, tol);
        let features: Vec<Feature> = faces
            .iter()
            .filter_map(|face| face_feature(&projector, face))
            .collect();

        let id = axis_id(&frame, &tol);
        info!(faces = faces.len(), features = features.len(), axis = ?id, "extracted");
        Ok(PartFeatures {
            features,
            axis: RotationAxis::Rotational(id),
        })
    }
}

fn face_feature(projector: &Projector, face: &FaceGeometry) -> Option<Feature> {
    let Some(kind) = feature_kind(&face.surface) else {
        debug!(face = face.face_id, "skipping planar face");
        return None;
    };
    let aligned = projector.is_aligned(&face.surface);

    let mut points: Vec<_> = face.vertices.iter().map(|v| projector.point(v)).collect();
    for circle in &face.circles {
        if projector.is_coaxial_circle(circle) {
            points.push(projector.circle_point(circle));
        } else if !aligned {
            points.extend(projector.circle_footprint(circle));
        }
    }
    let points = projector.finish(points);

    let mut feature = Feature::new(kind, polarity(face.same_sense), points)
        .with_label(format!("#{}", face.face_id));
    if !aligned {
        feature = feature.off_axis();
    }
    if let Some(radius) = face.surface.radius() {
        feature = feature.with_declared_radius(radius);
    }
    if let StepSurface::Cone(cone) = &face.surface {
        feature = feature.with_semi_angle(cone.semi_angle);
    }
    Some(feature)
}
