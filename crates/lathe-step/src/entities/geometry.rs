//! Points, directions, and placements.

use lathe_math::{AxisFrame, Dir3, Point3, Vec3};

use super::EntityArgs;
use crate::error::StepError;
use crate::parser::StepFile;

/// Parse a `CARTESIAN_POINT(name, (x, y, z))`.
pub fn parse_cartesian_point(file: &StepFile, id: u64) -> Result<Point3, StepError> {
    let entity = file.require(id)?;
    entity.expect_type("CARTESIAN_POINT")?;
    match entity.real_list(1)?.as_slice() {
        [x, y, z, ..] => Ok(Point3::new(*x, *y, *z)),
        coords => Err(StepError::parser(
            Some(id),
            format!("CARTESIAN_POINT needs 3 coordinates, got {}", coords.len()),
        )),
    }
}

/// Parse a `DIRECTION(name, (x, y, z))`, normalized.
pub fn parse_direction(file: &StepFile, id: u64) -> Result<Dir3, StepError> {
    let entity = file.require(id)?;
    entity.expect_type("DIRECTION")?;
    let v = match entity.real_list(1)?.as_slice() {
        [x, y, z, ..] => Vec3::new(*x, *y, *z),
        coords => {
            return Err(StepError::parser(
                Some(id),
                format!("DIRECTION needs 3 components, got {}", coords.len()),
            ))
        }
    };
    if v.norm() < 1e-15 {
        return Err(StepError::InvalidGeometry(format!("zero-length direction #{id}")));
    }
    Ok(Dir3::new_normalize(v))
}

/// Axis placement data (origin + optional directions).
#[derive(Debug, Clone, PartialEq)]
pub struct AxisPlacement {
    /// Location point.
    pub location: Point3,
    /// Z-axis direction.
    pub axis: Option<Dir3>,
    /// X-axis direction (reference).
    pub ref_direction: Option<Dir3>,
}

impl AxisPlacement {
    /// Z-axis direction, defaulting to +Z when unset.
    pub fn z_axis(&self) -> Dir3 {
        self.axis.unwrap_or_else(|| Dir3::new_normalize(Vec3::z()))
    }

    /// X-axis direction, derived from Z when unset.
    pub fn x_axis(&self) -> Dir3 {
        match self.ref_direction {
            Some(x) => x,
            None => {
                let z = self.z_axis();
                let arbitrary = if z.as_ref().x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
                Dir3::new_normalize(arbitrary - arbitrary.dot(z.as_ref()) * z.as_ref())
            }
        }
    }

    /// The placement's Z axis as a line.
    pub fn frame(&self) -> AxisFrame {
        AxisFrame {
            origin: self.location,
            direction: self.z_axis(),
        }
    }
}

fn optional_direction(file: &StepFile, id: u64, idx: usize) -> Result<Option<Dir3>, StepError> {
    let entity = file.require(id)?;
    if entity.is_null(idx) {
        return Ok(None);
    }
    parse_direction(file, entity.entity_ref(idx)?).map(Some)
}

/// Parse `AXIS1_PLACEMENT` or `AXIS2_PLACEMENT_3D`.
pub fn parse_any_axis_placement(file: &StepFile, id: u64) -> Result<AxisPlacement, StepError> {
    let entity = file.require(id)?;
    let location = parse_cartesian_point(file, entity.entity_ref(1)?)?;
    match entity.type_name.as_str() {
        "AXIS1_PLACEMENT" => Ok(AxisPlacement {
            location,
            axis: optional_direction(file, id, 2)?,
            ref_direction: None,
        }),
        "AXIS2_PLACEMENT_3D" => Ok(AxisPlacement {
            location,
            axis: optional_direction(file, id, 2)?,
            ref_direction: optional_direction(file, id, 3)?,
        }),
        other => Err(StepError::type_mismatch("AXIS_PLACEMENT", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::parse_step;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_cartesian_point() {
        let file = parse_step(
            "ISO-10303-21;\nDATA;\n\
             #1 = CARTESIAN_POINT('origin', (1.0, 2.0, 3.0));\nENDSEC;\nEND-ISO-10303-21;\n",
        );
        let p = parse_cartesian_point(&file, 1).unwrap();
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 2.0);
        assert_relative_eq!(p.z, 3.0);
    }

    #[test]
    fn test_zero_direction_is_invalid() {
        let file = parse_step(
            "ISO-10303-21;\nDATA;\n\
             #1 = DIRECTION('', (0.0, 0.0, 0.0));\nENDSEC;\nEND-ISO-10303-21;\n",
        );
        assert!(matches!(parse_direction(&file, 1), Err(StepError::InvalidGeometry(_))));
    }

    #[test]
    fn test_wrong_type_is_a_mismatch() {
        let file = parse_step(
            "ISO-10303-21;\nDATA;\n\
             #1 = DIRECTION('', (0.0, 0.0, 1.0));\nENDSEC;\nEND-ISO-10303-21;\n",
        );
        assert!(matches!(
            parse_cartesian_point(&file, 1),
            Err(StepError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_parse_axis2_placement_3d() {
        let input = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('', (0.0, 0.0, 5.0));
#2 = DIRECTION('', (0.0, 0.0, 2.0));
#3 = DIRECTION('', (1.0, 0.0, 0.0));
#4 = AXIS2_PLACEMENT_3D('', #1, #2, #3);
#5 = AXIS2_PLACEMENT_3D('', #1, $, $);
ENDSEC;
END-ISO-10303-21;
"#;
        let file = parse_step(input);
        let placement = parse_any_axis_placement(&file, 4).unwrap();
        assert_relative_eq!(placement.z_axis().as_ref().z, 1.0);
        assert_relative_eq!(placement.x_axis().as_ref().x, 1.0);
        let frame = placement.frame();
        assert_relative_eq!(frame.axial(&Point3::new(0.0, 0.0, 7.0)), 2.0);

        let defaulted = parse_any_axis_placement(&file, 5).unwrap();
        assert!(defaulted.axis.is_none());
        assert_relative_eq!(defaulted.z_axis().as_ref().z, 1.0);
    }
}
