//! Try extractors in order until one succeeds.

use tracing::warn;

use crate::{ExtractError, PartFeatures, SurfaceExtractor};

/// An ordered chain of extractors.
///
/// Each failure is logged and the next extractor is tried. The first
/// success wins; if all fail the result is [`ExtractError::AllFailed`].
#[derive(Default)]
pub struct FallbackExtractor {
    chain: Vec<Box<dyn SurfaceExtractor>>,
}

impl FallbackExtractor {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an extractor.
    pub fn with(mut self, extractor: impl SurfaceExtractor + 'static) -> Self {
        self.chain.push(Box::new(extractor));
        self
    }

    /// Names of the chained extractors, in order.
    pub fn names(&self) -> Vec<&'static str> {
        self.chain.iter().map(|e| e.name()).collect()
    }

    /// Like [`SurfaceExtractor::extract`], also returning which extractor succeeded.
    pub fn extract_named(
        &self,
        source: &[u8],
    ) -> Result<(&'static str, PartFeatures), ExtractError> {
        let mut attempts = Vec::new();
        for extractor in &self.chain {
            match extractor.extract(source) {
                Ok(part) => return Ok((extractor.name(), part)),
                Err(err) => {
                    warn!(
                        extractor = extractor.name(),
                        error = %err,
                        "extractor failed, trying next"
                    );
                    attempts.push((extractor.name().to_string(), err.to_string()));
                }
            }
        }
        Err(ExtractError::AllFailed(attempts))
    }
}

impl SurfaceExtractor for FallbackExtractor {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn extract(&self, source: &[u8]) -> Result<PartFeatures, ExtractError> {
        self.extract_named(source).map(|(_, part)| part)
    }
}
