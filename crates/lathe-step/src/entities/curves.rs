//! Curve entities. Only circles carry information a rotational profile needs.

use lathe_math::{Dir3, Point3};

use super::{parse_any_axis_placement, EntityArgs};
use crate::error::StepError;
use crate::parser::StepFile;

/// A circle: centre, plane normal, radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Centre point.
    pub center: Point3,
    /// Normal of the circle's plane.
    pub normal: Dir3,
    /// Radius.
    pub radius: f64,
}

/// Parse a `CIRCLE(name, position, radius)`.
pub fn parse_circle(file: &StepFile, id: u64) -> Result<Circle, StepError> {
    let entity = file.require(id)?;
    entity.expect_type("CIRCLE")?;
    let placement = parse_any_axis_placement(file, entity.entity_ref(1)?)?;
    let radius = entity.real(2)?;
    if radius.is_nan() || radius <= 0.0 {
        return Err(StepError::InvalidGeometry(format!("circle #{id} has radius {radius}")));
    }
    Ok(Circle {
        center: placement.location,
        normal: placement.z_axis(),
        radius,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::parse_step;
    use approx::assert_relative_eq;

    const CIRCLES: &str = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('', (0.0, 0.0, 12.0));
#2 = DIRECTION('', (0.0, 0.0, 1.0));
#3 = AXIS2_PLACEMENT_3D('', #1, #2, $);
#4 = CIRCLE('', #3, 8.5);
#5 = CIRCLE('', #3, 0.0);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_parse_circle() {
        let file = parse_step(CIRCLES);
        let c = parse_circle(&file, 4).unwrap();
        assert_relative_eq!(c.radius, 8.5);
        assert_relative_eq!(c.center.z, 12.0);
        assert_relative_eq!(c.normal.as_ref().z, 1.0);
    }

    #[test]
    fn test_zero_radius_circle_is_invalid() {
        let file = parse_step(CIRCLES);
        assert!(matches!(parse_circle(&file, 5), Err(StepError::InvalidGeometry(_))));
    }
}
