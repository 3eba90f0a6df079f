//! Typed decoders over the raw entity graph.
//!
//! Only the entities a rotational-profile reader needs are decoded:
//! placements, circles, the elementary surfaces, and the B-rep topology
//! chain from solid down to vertex.

mod curves;
mod geometry;
mod surfaces;
mod topology;

pub use curves::{parse_circle, Circle};
pub use geometry::{parse_any_axis_placement, parse_cartesian_point, AxisPlacement};
pub use surfaces::{
    parse_surface, ConeSurface, CylinderSurface, PlaneSurface, SphereSurface, StepSurface,
    TorusSurface,
};
pub use topology::{
    parse_advanced_face, parse_edge_curve, parse_edge_loop, parse_manifold_solid_brep,
    parse_shell, parse_vertex_point,
};

use crate::error::StepError;
use crate::parser::{StepEntity, StepValue};

/// Typed accessors for entity arguments.
pub(crate) trait EntityArgs {
    fn arg(&self, idx: usize) -> Result<&StepValue, StepError>;
    fn real(&self, idx: usize) -> Result<f64, StepError>;
    fn enumeration(&self, idx: usize) -> Result<&str, StepError>;
    fn entity_ref(&self, idx: usize) -> Result<u64, StepError>;
    fn real_list(&self, idx: usize) -> Result<Vec<f64>, StepError>;
    fn entity_ref_list(&self, idx: usize) -> Result<Vec<u64>, StepError>;
    fn is_null(&self, idx: usize) -> bool;

    /// `.T.` / `.F.` flag.
    fn boolean(&self, idx: usize) -> Result<bool, StepError> {
        match self.enumeration(idx)? {
            "T" => Ok(true),
            "F" => Ok(false),
            other => Err(StepError::InvalidTopology(format!("expected .T. or .F., got .{other}."))),
        }
    }
}

impl StepEntity {
    fn arg_error(&self, what: &str, idx: usize) -> StepError {
        StepError::parser(
            Some(self.id),
            format!("expected {what} at arg {idx} in {}", self.type_name),
        )
    }

    /// Returns a type mismatch error unless this entity is `expected`.
    pub(crate) fn expect_type(&self, expected: &str) -> Result<(), StepError> {
        if self.type_name == expected {
            Ok(())
        } else {
            Err(StepError::type_mismatch(expected, &self.type_name))
        }
    }
}

impl EntityArgs for StepEntity {
    fn arg(&self, idx: usize) -> Result<&StepValue, StepError> {
        self.args.get(idx).ok_or_else(|| self.arg_error("argument", idx))
    }

    fn real(&self, idx: usize) -> Result<f64, StepError> {
        self.arg(idx)?.as_real().ok_or_else(|| self.arg_error("real", idx))
    }

    fn enumeration(&self, idx: usize) -> Result<&str, StepError> {
        self.arg(idx)?.as_enum().ok_or_else(|| self.arg_error("enum", idx))
    }

    fn entity_ref(&self, idx: usize) -> Result<u64, StepError> {
        self.arg(idx)?
            .as_entity_ref()
            .ok_or_else(|| self.arg_error("entity ref", idx))
    }

    fn real_list(&self, idx: usize) -> Result<Vec<f64>, StepError> {
        let list = self.arg(idx)?.as_list().ok_or_else(|| self.arg_error("list", idx))?;
        list.iter()
            .map(|v| v.as_real().ok_or_else(|| self.arg_error("list of reals", idx)))
            .collect()
    }

    fn entity_ref_list(&self, idx: usize) -> Result<Vec<u64>, StepError> {
        let list = self.arg(idx)?.as_list().ok_or_else(|| self.arg_error("list", idx))?;
        list.iter()
            .map(|v| {
                v.as_entity_ref()
                    .ok_or_else(|| self.arg_error("list of entity refs", idx))
            })
            .collect()
    }

    fn is_null(&self, idx: usize) -> bool {
        self.args.get(idx).map_or(true, StepValue::is_null)
    }
}

#[cfg(test)]
pub(crate) fn parse_step(input: &str) -> crate::parser::StepFile {
    crate::parser::Parser::parse(input.as_bytes()).unwrap()
}
