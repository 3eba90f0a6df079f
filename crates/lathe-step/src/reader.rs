//! Face-level reader: walks every solid's B-rep and collects per-face geometry.

use std::collections::BTreeSet;
use std::path::Path;

use lathe_math::Point3;
use tracing::{debug, instrument};

use crate::entities::{
    parse_advanced_face, parse_circle, parse_edge_curve, parse_edge_loop,
    parse_manifold_solid_brep, parse_shell, parse_surface, parse_vertex_point, Circle, StepSurface,
};
use crate::error::StepError;
use crate::parser::{Parser, StepFile};

/// One `ADVANCED_FACE` with the geometry needed to place it in a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGeometry {
    /// `ADVANCED_FACE` entity ID.
    pub face_id: u64,
    /// Surface entity ID.
    pub surface_id: u64,
    /// Decoded surface.
    pub surface: StepSurface,
    /// Whether the face normal agrees with the surface normal.
    pub same_sense: bool,
    /// Positions of the distinct vertices on the face's bounds, in loop order.
    pub vertices: Vec<Point3>,
    /// Distinct circular edges on the face's bounds.
    pub circles: Vec<Circle>,
    /// Index of the owning solid, in entity ID order.
    pub solid_index: usize,
}

/// Read face geometry from a STEP file on disk.
pub fn read_faces(path: impl AsRef<Path>) -> Result<Vec<FaceGeometry>, StepError> {
    let data = std::fs::read(path)?;
    read_faces_from_buffer(&data)
}

/// Read face geometry from Part 21 bytes.
///
/// Faces are returned solid by solid, each solid's faces in shell order.
/// Returns [`StepError::NoSolids`] when the file has no `MANIFOLD_SOLID_BREP`.
#[instrument(skip_all, fields(bytes = data.len()))]
pub fn read_faces_from_buffer(data: &[u8]) -> Result<Vec<FaceGeometry>, StepError> {
    let file = Parser::parse(data)?;
    let solids: Vec<u64> = file
        .entities_of_type("MANIFOLD_SOLID_BREP")
        .map(|e| e.id)
        .collect();
    if solids.is_empty() {
        return Err(StepError::NoSolids);
    }

    let mut faces = Vec::new();
    for (solid_index, &solid_id) in solids.iter().enumerate() {
        let shell = parse_manifold_solid_brep(&file, solid_id)?;
        let face_ids = parse_shell(&file, shell)?;
        debug!(solid = solid_id, faces = face_ids.len(), "reading solid");
        for face_id in face_ids {
            faces.push(read_face(&file, face_id, solid_index)?);
        }
    }
    Ok(faces)
}

fn read_face(file: &StepFile, face_id: u64, solid_index: usize) -> Result<FaceGeometry, StepError> {
    let face = parse_advanced_face(file, face_id)?;
    let surface = parse_surface(file, face.surface_id)?;

    let mut seen_vertices = BTreeSet::new();
    let mut seen_edges = BTreeSet::new();
    let mut vertices = Vec::new();
    let mut circles = Vec::new();

    for bound in &face.bounds {
        for oriented in parse_edge_loop(file, bound.loop_id)? {
            if !seen_edges.insert(oriented.edge_id) {
                continue;
            }
            let edge = parse_edge_curve(file, oriented.edge_id)?;
            for vertex_id in [edge.start_vertex_id, edge.end_vertex_id] {
                if seen_vertices.insert(vertex_id) {
                    vertices.push(parse_vertex_point(file, vertex_id)?);
                }
            }
            if let Some(circle) = edge_circle(file, edge.curve_id)? {
                circles.push(circle);
            }
        }
    }

    Ok(FaceGeometry {
        face_id,
        surface_id: face.surface_id,
        surface,
        same_sense: face.same_sense,
        vertices,
        circles,
        solid_index,
    })
}

/// The circle underneath an edge, looking through `SURFACE_CURVE` / `SEAM_CURVE` wrappers.
fn edge_circle(file: &StepFile, curve_id: u64) -> Result<Option<Circle>, StepError> {
    let entity = file.require(curve_id)?;
    match entity.type_name.as_str() {
        "CIRCLE" => parse_circle(file, curve_id).map(Some),
        "SURFACE_CURVE" | "SEAM_CURVE" => match entity.args.get(1).and_then(|v| v.as_entity_ref()) {
            Some(inner) if inner != curve_id => edge_circle(file, inner),
            _ => Ok(None),
        },
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// A plain cylinder, radius 5, from z=0 to z=20, with its two caps.
    const CYLINDER: &str = r#"
ISO-10303-21;
HEADER;
FILE_DESCRIPTION(('cylinder'), '2;1');
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('', (0.0, 0.0, 0.0));
#2 = CARTESIAN_POINT('', (0.0, 0.0, 20.0));
#3 = DIRECTION('', (0.0, 0.0, 1.0));
#4 = DIRECTION('', (1.0, 0.0, 0.0));
#5 = AXIS2_PLACEMENT_3D('', #1, #3, #4);
#6 = AXIS2_PLACEMENT_3D('', #2, #3, #4);
#10 = CARTESIAN_POINT('', (5.0, 0.0, 0.0));
#11 = CARTESIAN_POINT('', (5.0, 0.0, 20.0));
#12 = VERTEX_POINT('', #10);
#13 = VERTEX_POINT('', #11);
#20 = CIRCLE('', #5, 5.0);
#21 = CIRCLE('', #6, 5.0);
#22 = LINE('', #10, #23);
#23 = VECTOR('', #3, 1.0);
#30 = EDGE_CURVE('', #12, #12, #20, .T.);
#31 = EDGE_CURVE('', #13, #13, #21, .T.);
#32 = EDGE_CURVE('', #12, #13, #33, .T.);
#33 = SEAM_CURVE('', #22, (), .PCURVE_S1.);
#40 = ORIENTED_EDGE('', *, *, #30, .T.);
#41 = ORIENTED_EDGE('', *, *, #32, .T.);
#42 = ORIENTED_EDGE('', *, *, #31, .F.);
#43 = ORIENTED_EDGE('', *, *, #32, .F.);
#44 = EDGE_LOOP('', (#40, #41, #42, #43));
#45 = FACE_OUTER_BOUND('', #44, .T.);
#50 = CYLINDRICAL_SURFACE('', #5, 5.0);
#51 = ADVANCED_FACE('', (#45), #50, .T.);
#60 = EDGE_LOOP('', (#40));
#61 = FACE_OUTER_BOUND('', #60, .T.);
#62 = PLANE('', #5);
#63 = ADVANCED_FACE('', (#61), #62, .F.);
#64 = EDGE_LOOP('', (#42));
#65 = FACE_OUTER_BOUND('', #64, .T.);
#66 = PLANE('', #6);
#67 = ADVANCED_FACE('', (#65), #66, .T.);
#70 = CLOSED_SHELL('', (#51, #63, #67));
#71 = MANIFOLD_SOLID_BREP('cylinder', #70);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_read_cylinder_faces() {
        let faces = read_faces_from_buffer(CYLINDER.as_bytes()).unwrap();
        assert_eq!(faces.len(), 3);

        let lateral = &faces[0];
        assert_eq!(lateral.face_id, 51);
        assert!(lateral.same_sense);
        assert_eq!(lateral.surface.type_name(), "CYLINDRICAL_SURFACE");
        assert_eq!(lateral.vertices.len(), 2);
        assert_eq!(lateral.circles.len(), 2);
        assert_relative_eq!(lateral.circles[1].center.z, 20.0);

        assert_eq!(faces[1].surface.type_name(), "PLANE");
        assert_eq!(faces[1].circles.len(), 1);
        assert!(faces.iter().all(|f| f.solid_index == 0));
    }

    #[test]
    fn test_seam_line_is_not_a_circle() {
        let file = Parser::parse(CYLINDER.as_bytes()).unwrap();
        assert_eq!(edge_circle(&file, 33).unwrap(), None);
        assert!(edge_circle(&file, 20).unwrap().is_some());
    }

    #[test]
    fn test_no_solids() {
        let input = "ISO-10303-21;\nDATA;\n\
            #1 = CARTESIAN_POINT('', (0.0, 0.0, 0.0));\nENDSEC;\nEND-ISO-10303-21;\n";
        assert!(matches!(
            read_faces_from_buffer(input.as_bytes()),
            Err(StepError::NoSolids)
        ));
    }

    #[test]
    fn test_dangling_reference_is_reported() {
        let input = "ISO-10303-21;\nDATA;\n\
            #1 = MANIFOLD_SOLID_BREP('', #2);\nENDSEC;\nEND-ISO-10303-21;\n";
        assert!(matches!(
            read_faces_from_buffer(input.as_bytes()),
            Err(StepError::MissingEntity(2))
        ));
    }
}
