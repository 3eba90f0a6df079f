//! Per-file JSON reports.

use std::path::Path;

use lathe_contour::{build_contour_with, Contour};
use lathe_extract::{
    default_chain, BrepExtractor, ExtractError, FallbackExtractor, PartFeatures, SurfaceExtractor,
    TextPatternExtractor,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::ExtractorChoice;

/// The extractor selected on the command line.
pub enum Extractor {
    Single(Box<dyn SurfaceExtractor>),
    Chain(FallbackExtractor),
}

impl Extractor {
    pub fn new(choice: ExtractorChoice, config: &Config) -> Self {
        match choice {
            ExtractorChoice::Brep => Self::Single(Box::new(BrepExtractor::new(config.extract))),
            ExtractorChoice::Text => {
                Self::Single(Box::new(TextPatternExtractor::new(config.extract)))
            }
            ExtractorChoice::Auto => Self::Chain(default_chain(config.extract)),
        }
    }

    /// Extract, naming the extractor that produced the result.
    pub fn extract(&self, source: &[u8]) -> Result<(&'static str, PartFeatures), ExtractError> {
        match self {
            Self::Single(extractor) => extractor
                .extract(source)
                .map(|part| (extractor.name(), part)),
            Self::Chain(chain) => chain.extract_named(source),
        }
    }
}

/// Where a file's processing stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Read,
    Extract,
    Contour,
}

/// One line of `lathe contour` output.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FileReport {
    Built {
        file: String,
        extractor: &'static str,
        contour: Contour,
    },
    Failed {
        file: String,
        stage: Stage,
        error: String,
        /// `true` for outcomes such as a prismatic part that are not faults.
        expected: bool,
    },
}

impl FileReport {
    fn failed(file: String, stage: Stage, error: impl ToString, expected: bool) -> Self {
        Self::Failed {
            file,
            stage,
            error: error.to_string(),
            expected,
        }
    }

    /// An I/O or extraction failure. Contour errors are reported but are not faults of the run.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Failed { stage, .. } if *stage != Stage::Contour)
    }
}

pub fn contour_file(path: &Path, extractor: &Extractor, config: &Config) -> FileReport {
    let file = path.display().to_string();
    match std::fs::read(path) {
        Ok(data) => contour_report(file, &data, extractor, config),
        Err(err) => FileReport::failed(file, Stage::Read, err, false),
    }
}

pub fn contour_report(
    file: String,
    data: &[u8],
    extractor: &Extractor,
    config: &Config,
) -> FileReport {
    let (name, part) = match extractor.extract(data) {
        Ok(extracted) => extracted,
        Err(err) => {
            warn!(file = %file, error = %err, "extraction failed");
            return FileReport::failed(file, Stage::Extract, err, false);
        }
    };
    match build_contour_with(&part.features, part.axis, &config.contour) {
        Ok(contour) => {
            info!(
                file = %file,
                extractor = name,
                outer = contour.outer.len(),
                holes = contour.hole_count,
                "built"
            );
            FileReport::Built {
                file,
                extractor: name,
                contour,
            }
        }
        Err(err) => {
            let expected = err.is_expected();
            if !expected {
                warn!(file = %file, error = %err, "contour failed");
            }
            FileReport::failed(file, Stage::Contour, err, expected)
        }
    }
}
