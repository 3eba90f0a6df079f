//! Error types for surface extraction.

use lathe_step::StepError;
use thiserror::Error;

/// Errors that can occur while extracting features from a part file.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The STEP reader rejected the file.
    #[error("STEP error: {0}")]
    Step(#[from] StepError),

    /// The text scanner could not make sense of the file.
    #[error("pattern scan failed: {0}")]
    Pattern(String),

    /// The file has no faces to extract.
    #[error("no surfaces found")]
    NoSurfaces,

    /// Every extractor in a fallback chain failed, as `(extractor, error)`.
    #[error("all extractors failed: {}", format_attempts(.0))]
    AllFailed(Vec<(String, String)>),
}

fn format_attempts(attempts: &[(String, String)]) -> String {
    attempts
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}
