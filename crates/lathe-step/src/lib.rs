#![warn(missing_docs)]

//! STEP file reading for the lathe contour builder.
//!
//! Parses ISO 10303-21 physical files into a raw entity graph and decodes
//! the face-level geometry a rotational-contour extractor needs: each
//! face's underlying surface, its sense, the positions of its bounding
//! vertices, and its circular edges.
//!
//! # Example
//!
//! ```no_run
//! use lathe_step::read_faces;
//!
//! let faces = read_faces("shaft.step").unwrap();
//! for face in &faces {
//!     let kind = face.surface.type_name();
//!     println!("#{} {kind} ({} vertices)", face.face_id, face.vertices.len());
//! }
//! ```

mod error;
mod lexer;
mod parser;
mod entities;
mod reader;

pub use error::StepError;
pub use entities::{
    AxisPlacement, Circle, ConeSurface, CylinderSurface, PlaneSurface, SphereSurface,
    StepSurface, TorusSurface,
};
pub use parser::{Parser, StepEntity, StepFile, StepValue};
pub use reader::{read_faces, read_faces_from_buffer, FaceGeometry};
