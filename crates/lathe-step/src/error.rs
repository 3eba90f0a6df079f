//! Reader errors.

use thiserror::Error;

/// Why a Part 21 file could not be turned into face geometry.
#[derive(Error, Debug)]
pub enum StepError {
    /// The file could not be read.
    #[error("cannot read STEP file: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed token at a 1-based source position.
    #[error("{line}:{col}: {message}")]
    Lexer {
        /// Line, from 1.
        line: usize,
        /// Column, from 1.
        col: usize,
        /// What was wrong.
        message: String,
    },

    /// Well-formed tokens in an invalid order, optionally inside a known entity.
    #[error("{}{message}", entity_id.map(|id| format!("#{id}: ")).unwrap_or_default())]
    Parser {
        /// Entity being parsed, if any.
        entity_id: Option<u64>,
        /// What was wrong.
        message: String,
    },

    /// A `#id` reference with no matching record.
    #[error("dangling reference #{0}")]
    MissingEntity(u64),

    /// Geometry that cannot be placed: zero direction, non-positive radius.
    #[error("bad geometry: {0}")]
    InvalidGeometry(String),

    /// Topology that cannot be walked: faces without bounds, bad booleans.
    #[error("bad topology: {0}")]
    InvalidTopology(String),

    /// A reference pointed at the wrong kind of entity.
    #[error("expected {expected}, found {actual}")]
    TypeMismatch {
        /// Entity type (or family) that was required.
        expected: String,
        /// Entity type actually found.
        actual: String,
    },

    /// The DATA section has no `MANIFOLD_SOLID_BREP`.
    #[error("no solid bodies in file")]
    NoSolids,
}

impl StepError {
    pub(crate) fn lexer(line: usize, col: usize, message: impl Into<String>) -> Self {
        Self::Lexer {
            line,
            col,
            message: message.into(),
        }
    }

    pub(crate) fn parser(entity_id: Option<u64>, message: impl Into<String>) -> Self {
        Self::Parser {
            entity_id,
            message: message.into(),
        }
    }

    pub(crate) fn type_mismatch(expected: &str, actual: &str) -> Self {
        Self::TypeMismatch {
            expected: expected.to_owned(),
            actual: actual.to_owned(),
        }
    }
}
