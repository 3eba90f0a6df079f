//! Surface entities: planes, cylinders, cones, spheres, tori.
//!
//! Surfaces are kept in their STEP parameterisation. A cone's `radius` is
//! its radius in the placement plane and `semi_angle` its half-angle in
//! radians; the radius grows along the placement's Z axis.

use lathe_math::{AxisFrame, Dir3, Point3};

use super::{parse_any_axis_placement, EntityArgs};
use crate::error::StepError;
use crate::parser::StepFile;

/// `PLANE(name, position)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneSurface {
    /// A point on the plane.
    pub origin: Point3,
    /// Plane normal.
    pub normal: Dir3,
}

/// `CYLINDRICAL_SURFACE(name, position, radius)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylinderSurface {
    /// Cylinder axis.
    pub axis: AxisFrame,
    /// Radius.
    pub radius: f64,
}

/// `CONICAL_SURFACE(name, position, radius, semi_angle)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConeSurface {
    /// Cone axis, with `origin` at the reference circle.
    pub axis: AxisFrame,
    /// Radius at the reference circle.
    pub radius: f64,
    /// Half-angle in radians.
    pub semi_angle: f64,
}

impl ConeSurface {
    /// Radius at signed distance `t` from the reference circle, along the axis.
    pub fn radius_at(&self, t: f64) -> f64 {
        self.radius + t * self.semi_angle.tan()
    }
}

/// `SPHERICAL_SURFACE(name, position, radius)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereSurface {
    /// Centre.
    pub center: Point3,
    /// Radius.
    pub radius: f64,
}

/// `TOROIDAL_SURFACE(name, position, major_radius, minor_radius)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorusSurface {
    /// Axis of revolution.
    pub axis: AxisFrame,
    /// Distance from the axis to the tube centre.
    pub major_radius: f64,
    /// Tube radius.
    pub minor_radius: f64,
}

/// The geometry underneath a face.
#[derive(Debug, Clone, PartialEq)]
pub enum StepSurface {
    /// Plane.
    Plane(PlaneSurface),
    /// Cylinder.
    Cylinder(CylinderSurface),
    /// Cone.
    Cone(ConeSurface),
    /// Sphere.
    Sphere(SphereSurface),
    /// Torus.
    Torus(TorusSurface),
    /// Any other surface type (B-spline, surface of revolution, ...), by entity name.
    Other(String),
}

impl StepSurface {
    /// Axis of a surface of revolution, if it has one.
    pub fn axis(&self) -> Option<AxisFrame> {
        match self {
            StepSurface::Cylinder(c) => Some(c.axis),
            StepSurface::Cone(c) => Some(c.axis),
            StepSurface::Torus(t) => Some(t.axis),
            _ => None,
        }
    }

    /// Nominal radius, as written in the file.
    pub fn radius(&self) -> Option<f64> {
        match self {
            StepSurface::Cylinder(c) => Some(c.radius),
            StepSurface::Cone(c) => Some(c.radius),
            StepSurface::Sphere(s) => Some(s.radius),
            StepSurface::Torus(t) => Some(t.major_radius),
            _ => None,
        }
    }

    /// STEP entity name.
    pub fn type_name(&self) -> &str {
        match self {
            StepSurface::Plane(_) => "PLANE",
            StepSurface::Cylinder(_) => "CYLINDRICAL_SURFACE",
            StepSurface::Cone(_) => "CONICAL_SURFACE",
            StepSurface::Sphere(_) => "SPHERICAL_SURFACE",
            StepSurface::Torus(_) => "TOROIDAL_SURFACE",
            StepSurface::Other(name) => name,
        }
    }
}

fn positive(id: u64, what: &str, value: f64) -> Result<f64, StepError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(StepError::InvalidGeometry(format!("surface #{id} has {what} {value}")))
    }
}

/// Decode any surface entity. Unknown surface types become [`StepSurface::Other`].
pub fn parse_surface(file: &StepFile, id: u64) -> Result<StepSurface, StepError> {
    let entity = file.require(id)?;
    let placement =
        || -> Result<_, StepError> { parse_any_axis_placement(file, entity.entity_ref(1)?) };

    let surface = match entity.type_name.as_str() {
        "PLANE" => {
            let p = placement()?;
            StepSurface::Plane(PlaneSurface {
                origin: p.location,
                normal: p.z_axis(),
            })
        }
        "CYLINDRICAL_SURFACE" => StepSurface::Cylinder(CylinderSurface {
            axis: placement()?.frame(),
            radius: positive(id, "radius", entity.real(2)?)?,
        }),
        "CONICAL_SURFACE" => {
            let radius = entity.real(2)?;
            if radius < 0.0 {
                return Err(StepError::InvalidGeometry(format!(
                    "surface #{id} has radius {radius}"
                )));
            }
            StepSurface::Cone(ConeSurface {
                axis: placement()?.frame(),
                radius,
                semi_angle: positive(id, "semi-angle", entity.real(3)?)?,
            })
        }
        "SPHERICAL_SURFACE" => StepSurface::Sphere(SphereSurface {
            center: placement()?.location,
            radius: positive(id, "radius", entity.real(2)?)?,
        }),
        "TOROIDAL_SURFACE" => StepSurface::Torus(TorusSurface {
            axis: placement()?.frame(),
            major_radius: positive(id, "major radius", entity.real(2)?)?,
            minor_radius: positive(id, "minor radius", entity.real(3)?)?,
        }),
        other => StepSurface::Other(other.to_string()),
    };
    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::parse_step;
    use approx::assert_relative_eq;

    const SURFACES: &str = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('', (0.0, 0.0, 10.0));
#2 = DIRECTION('', (0.0, 0.0, 1.0));
#3 = AXIS2_PLACEMENT_3D('', #1, #2, $);
#10 = PLANE('', #3);
#11 = CYLINDRICAL_SURFACE('', #3, 8.0);
#12 = CONICAL_SURFACE('', #3, 4.0, 0.785398163397448);
#13 = TOROIDAL_SURFACE('', #3, 6.0, 1.0);
#14 = B_SPLINE_SURFACE_WITH_KNOTS('', 3, 3, (), .UNSPECIFIED., .F., .F., .F.,
  (), (), (), (), .UNSPECIFIED.);
#15 = CYLINDRICAL_SURFACE('', #3, -1.0);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_parse_cylinder() {
        let file = parse_step(SURFACES);
        let s = parse_surface(&file, 11).unwrap();
        let StepSurface::Cylinder(c) = s else {
            panic!("expected cylinder, got {s:?}");
        };
        assert_relative_eq!(c.radius, 8.0);
        assert_relative_eq!(c.axis.origin.z, 10.0);
        assert_eq!(s.type_name(), "CYLINDRICAL_SURFACE");
    }

    #[test]
    fn test_cone_radius_grows_along_axis() {
        let file = parse_step(SURFACES);
        let StepSurface::Cone(cone) = parse_surface(&file, 12).unwrap() else {
            panic!("expected cone");
        };
        assert_relative_eq!(cone.radius_at(0.0), 4.0);
        assert_relative_eq!(cone.radius_at(2.0), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn test_axis_only_for_revolved_surfaces() {
        let file = parse_step(SURFACES);
        assert!(parse_surface(&file, 10).unwrap().axis().is_none());
        assert!(parse_surface(&file, 13).unwrap().axis().is_some());
    }

    #[test]
    fn test_unknown_surface_is_other() {
        let file = parse_step(SURFACES);
        assert_eq!(
            parse_surface(&file, 14).unwrap(),
            StepSurface::Other("B_SPLINE_SURFACE_WITH_KNOTS".into())
        );
    }

    #[test]
    fn test_negative_radius_is_invalid() {
        let file = parse_step(SURFACES);
        assert!(matches!(parse_surface(&file, 15), Err(StepError::InvalidGeometry(_))));
    }
}
