//! Topology entities: vertex, edge, loop, face, shell, and solid.

use lathe_math::Point3;

use super::{parse_cartesian_point, EntityArgs};
use crate::error::StepError;
use crate::parser::StepFile;

/// Parsed EDGE_CURVE entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeCurve {
    /// The entity ID.
    pub id: u64,
    /// Start vertex entity ID.
    pub start_vertex_id: u64,
    /// End vertex entity ID.
    pub end_vertex_id: u64,
    /// Edge geometry (curve) entity ID.
    pub curve_id: u64,
}

/// Parsed ORIENTED_EDGE entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedEdge {
    /// The underlying edge entity ID.
    pub edge_id: u64,
    /// Orientation of the edge within its loop.
    pub orientation: bool,
}

/// Parsed FACE_BOUND / FACE_OUTER_BOUND entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceBound {
    /// The loop entity ID.
    pub loop_id: u64,
    /// Whether the bound orientation matches the face orientation.
    pub orientation: bool,
    /// Whether this is an outer bound.
    pub is_outer: bool,
}

/// Parsed ADVANCED_FACE entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvancedFace {
    /// The entity ID.
    pub id: u64,
    /// Face bounds (outer and inner loops).
    pub bounds: Vec<FaceBound>,
    /// Surface geometry entity ID.
    pub surface_id: u64,
    /// Whether the face normal agrees with the surface normal.
    pub same_sense: bool,
}

/// Parse a VERTEX_POINT entity to its position.
pub fn parse_vertex_point(file: &StepFile, id: u64) -> Result<Point3, StepError> {
    let entity = file.require(id)?;
    entity.expect_type("VERTEX_POINT")?;
    parse_cartesian_point(file, entity.entity_ref(1)?)
}

/// Parse an EDGE_CURVE entity.
pub fn parse_edge_curve(file: &StepFile, id: u64) -> Result<EdgeCurve, StepError> {
    let entity = file.require(id)?;
    entity.expect_type("EDGE_CURVE")?;
    Ok(EdgeCurve {
        id,
        start_vertex_id: entity.entity_ref(1)?,
        end_vertex_id: entity.entity_ref(2)?,
        curve_id: entity.entity_ref(3)?,
    })
}

fn parse_oriented_edge(file: &StepFile, id: u64) -> Result<OrientedEdge, StepError> {
    let entity = file.require(id)?;
    entity.expect_type("ORIENTED_EDGE")?;
    // (name, *, *, edge_element, orientation)
    Ok(OrientedEdge {
        edge_id: entity.entity_ref(3)?,
        orientation: entity.boolean(4)?,
    })
}

/// Parse an EDGE_LOOP entity into its oriented edges.
///
/// A `VERTEX_LOOP` (the degenerate bound at a cone apex) yields no edges.
pub fn parse_edge_loop(file: &StepFile, id: u64) -> Result<Vec<OrientedEdge>, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "EDGE_LOOP" => entity
            .entity_ref_list(1)?
            .into_iter()
            .map(|edge| parse_oriented_edge(file, edge))
            .collect(),
        "VERTEX_LOOP" => Ok(Vec::new()),
        other => Err(StepError::type_mismatch("EDGE_LOOP", other)),
    }
}

/// Parse a FACE_BOUND or FACE_OUTER_BOUND entity.
pub fn parse_face_bound(file: &StepFile, id: u64) -> Result<FaceBound, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "FACE_BOUND" | "FACE_OUTER_BOUND" => Ok(FaceBound {
            loop_id: entity.entity_ref(1)?,
            orientation: entity.boolean(2)?,
            is_outer: entity.type_name == "FACE_OUTER_BOUND",
        }),
        other => Err(StepError::type_mismatch("FACE_BOUND", other)),
    }
}

/// Parse an ADVANCED_FACE entity.
pub fn parse_advanced_face(file: &StepFile, id: u64) -> Result<AdvancedFace, StepError> {
    let entity = file.require(id)?;
    entity.expect_type("ADVANCED_FACE")?;
    let bounds = entity
        .entity_ref_list(1)?
        .into_iter()
        .map(|bound| parse_face_bound(file, bound))
        .collect::<Result<Vec<_>, _>>()?;
    if bounds.is_empty() {
        return Err(StepError::InvalidTopology(format!("face #{id} has no bounds")));
    }
    Ok(AdvancedFace {
        id,
        bounds,
        surface_id: entity.entity_ref(2)?,
        same_sense: entity.boolean(3)?,
    })
}

/// Parse a CLOSED_SHELL or OPEN_SHELL entity to its face IDs.
pub fn parse_shell(file: &StepFile, id: u64) -> Result<Vec<u64>, StepError> {
    let entity = file.require(id)?;
    match entity.type_name.as_str() {
        "CLOSED_SHELL" | "OPEN_SHELL" => entity.entity_ref_list(1),
        other => Err(StepError::type_mismatch("SHELL", other)),
    }
}

/// Parse a MANIFOLD_SOLID_BREP entity to its outer shell ID.
pub fn parse_manifold_solid_brep(file: &StepFile, id: u64) -> Result<u64, StepError> {
    let entity = file.require(id)?;
    entity.expect_type("MANIFOLD_SOLID_BREP")?;
    entity.entity_ref(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::parse_step;

    const TOPOLOGY: &str = r#"
ISO-10303-21;
HEADER;
ENDSEC;
DATA;
#1 = CARTESIAN_POINT('', (5.0, 0.0, 0.0));
#2 = VERTEX_POINT('', #1);
#3 = EDGE_CURVE('', #2, #2, #40, .T.);
#4 = ORIENTED_EDGE('', *, *, #3, .F.);
#5 = EDGE_LOOP('', (#4));
#6 = FACE_OUTER_BOUND('', #5, .T.);
#7 = ADVANCED_FACE('', (#6), #41, .F.);
#8 = CLOSED_SHELL('', (#7));
#9 = MANIFOLD_SOLID_BREP('part', #8);
#10 = VERTEX_LOOP('', #2);
#11 = ADVANCED_FACE('', (), #41, .T.);
ENDSEC;
END-ISO-10303-21;
"#;

    #[test]
    fn test_walk_solid_to_vertex() {
        let file = parse_step(TOPOLOGY);
        let shell = parse_manifold_solid_brep(&file, 9).unwrap();
        assert_eq!(parse_shell(&file, shell).unwrap(), vec![7]);

        let face = parse_advanced_face(&file, 7).unwrap();
        assert_eq!(face.surface_id, 41);
        assert!(!face.same_sense);
        assert!(face.bounds[0].is_outer);

        let edges = parse_edge_loop(&file, face.bounds[0].loop_id).unwrap();
        assert_eq!(edges, vec![OrientedEdge { edge_id: 3, orientation: false }]);

        let edge = parse_edge_curve(&file, 3).unwrap();
        assert_eq!(edge.curve_id, 40);
        let p = parse_vertex_point(&file, edge.start_vertex_id).unwrap();
        assert!((p.x - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_vertex_loop_has_no_edges() {
        let file = parse_step(TOPOLOGY);
        assert!(parse_edge_loop(&file, 10).unwrap().is_empty());
    }

    #[test]
    fn test_face_without_bounds_is_invalid() {
        let file = parse_step(TOPOLOGY);
        assert!(matches!(
            parse_advanced_face(&file, 11),
            Err(StepError::InvalidTopology(_))
        ));
    }
}
