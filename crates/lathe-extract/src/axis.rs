//! Rotation axis selection and projection onto the axial half-plane.

use lathe_contour::{AxialPoint, AxisId, FeatureKind, Polarity};
use lathe_math::{AxisFrame, Dir3, Tolerance, Vec3};
use lathe_step::{Circle, StepSurface};

struct AxisGroup {
    frame: AxisFrame,
    count: usize,
    max_radius: f64,
}

/// Pick the rotation axis from the axes of the rotational surfaces.
///
/// Surfaces are grouped by coaxiality. The group with the most members wins;
/// ties go to the largest radius, then to the group seen first. Returns the
/// winner in canonical orientation, or `None` if there are no candidates.
pub(crate) fn choose_axis(
    candidates: impl IntoIterator<Item = (AxisFrame, f64)>,
    tol: &Tolerance,
) -> Option<AxisFrame> {
    let mut groups: Vec<AxisGroup> = Vec::new();
    for (frame, radius) in candidates {
        match groups.iter_mut().find(|g| g.frame.is_coaxial(&frame, tol)) {
            Some(group) => {
                group.count += 1;
                group.max_radius = group.max_radius.max(radius);
            }
            None => groups.push(AxisGroup {
                frame,
                count: 1,
                max_radius: radius,
            }),
        }
    }

    let mut best: Option<&AxisGroup> = None;
    for group in &groups {
        let better = match best {
            None => true,
            Some(b) => {
                group.count > b.count
                    || (group.count == b.count && group.max_radius > b.max_radius + tol.linear)
            }
        };
        if better {
            best = Some(group);
        }
    }
    best.map(|g| g.frame.canonical())
}

/// Name a frame's direction if it lies along a global axis.
pub(crate) fn axis_id(frame: &AxisFrame, tol: &Tolerance) -> AxisId {
    let along = |v: Vec3| tol.directions_parallel(&frame.direction, &Dir3::new_normalize(v));
    if along(Vec3::x()) {
        AxisId::X
    } else if along(Vec3::y()) {
        AxisId::Y
    } else if along(Vec3::z()) {
        AxisId::Z
    } else {
        AxisId::Custom
    }
}

/// Feature kind for a face's surface. Planes yield `None`: they contribute
/// no radial extent of their own.
pub(crate) fn feature_kind(surface: &StepSurface) -> Option<FeatureKind> {
    match surface {
        StepSurface::Plane(_) => None,
        StepSurface::Cylinder(_) => Some(FeatureKind::Cylindrical),
        StepSurface::Cone(_) => Some(FeatureKind::Conical),
        StepSurface::Torus(_) => Some(FeatureKind::Toroidal),
        StepSurface::Sphere(_) | StepSurface::Other(_) => Some(FeatureKind::Other),
    }
}

/// A face whose normal agrees with its surface normal bounds the outside.
pub(crate) fn polarity(same_sense: bool) -> Polarity {
    if same_sense {
        Polarity::Outer
    } else {
        Polarity::Inner
    }
}

/// Maps 3D geometry onto the chosen rotation axis.
pub(crate) struct Projector {
    pub frame: AxisFrame,
    pub tol: Tolerance,
}

impl Projector {
    pub fn new(frame: AxisFrame, tol: Tolerance) -> Self {
        Self { frame, tol }
    }

    pub fn point(&self, p: &lathe_math::Point3) -> AxialPoint {
        self.frame.project(p).into()
    }

    /// Whether the surface shares the rotation axis. Spheres count when
    /// their centre is on the axis; surfaces without an axis are assumed
    /// aligned and left to the classifier.
    pub fn is_aligned(&self, surface: &StepSurface) -> bool {
        match surface {
            StepSurface::Sphere(s) => self.frame.radial(&s.center) < self.tol.linear,
            other => match other.axis() {
                Some(axis) => self.frame.is_coaxial(&axis, &self.tol),
                None => true,
            },
        }
    }

    /// A circle centred on the axis in a plane perpendicular to it.
    pub fn is_coaxial_circle(&self, circle: &Circle) -> bool {
        self.tol.directions_parallel(&circle.normal, &self.frame.direction)
            && self.frame.radial(&circle.center) < self.tol.linear
    }

    /// A coaxial circle's `(axial, radius)`.
    pub fn circle_point(&self, circle: &Circle) -> AxialPoint {
        AxialPoint::new(self.frame.axial(&circle.center), circle.radius)
    }

    /// Four extreme points of a circle that is not coaxial: the ends of two
    /// perpendicular diameters.
    pub fn circle_footprint(&self, circle: &Circle) -> Vec<AxialPoint> {
        let n = circle.normal.as_ref();
        let seed = if n.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
        let u = n.cross(&seed).normalize() * circle.radius;
        let v = n.cross(&u);
        [u, -u, v, -v]
            .iter()
            .map(|d| self.point(&(circle.center + *d)))
            .collect()
    }

    /// Sort by axial position, then radius, and drop coincident points.
    pub fn finish(&self, mut points: Vec<AxialPoint>) -> Vec<AxialPoint> {
        points.sort_by(|a, b| {
            a.axial
                .total_cmp(&b.axial)
                .then(a.radius.total_cmp(&b.radius))
        });
        let linear = self.tol.linear;
        points.dedup_by(|next, kept| {
            (next.axial - kept.axial).abs() < linear && (next.radius - kept.radius).abs() < linear
        });
        points
    }
}
