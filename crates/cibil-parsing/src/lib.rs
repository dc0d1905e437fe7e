use cibil_core::DocumentBackend;
use thiserror::Error;

pub mod classify;
pub mod config;
pub mod extractor;
pub mod matcher;
pub mod page;
pub mod text_processing;
pub mod walker;

pub use classify::{classify, reject};
pub use config::{ExtractorConfig, ExtractorConfigBuilder, ListOverride};
pub use extractor::ScoreExtractor;
pub use matcher::find_score;
pub use text_processing::normalize;
pub use walker::{WalkOutcome, walk_document};
// Re-export domain types from core (canonical definitions live there)
pub use cibil_core::{
    DocumentError, ExtractionResult, ExtractionStrategy, InvalidInputReason, MatchSource,
    ScanPhase, ScoreMatch, UnreadableReason,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid score rule: {0}")]
    Regex(#[from] regex::Error),
    #[error("score rule has no capture group: {0}")]
    MissingCaptureGroup(String),
    #[error("minimum score {min} is above maximum score {max}")]
    InvalidBounds { min: u16, max: u16 },
    #[error("at least one extraction strategy is required")]
    NoStrategies,
}

/// Extract a score from a document payload using the given backend.
///
/// Pipeline:
/// 1. Open the payload via `backend` (open failures are final)
/// 2. For each of the first three pages, try every strategy and match each
///    strategy's normalized text on its own
/// 3. Otherwise aggregate all strategies of all pages and match once
/// 4. Classify the outcome into an [`ExtractionResult`]
pub fn extract_score(bytes: &[u8], backend: &dyn DocumentBackend) -> ExtractionResult {
    ScoreExtractor::new().extract_score(bytes, backend)
}
