use cibil_core::{DocumentBackend, DocumentError, DocumentPage, ExtractionResult, ScoreMatch};

use crate::config::ExtractorConfig;
use crate::walker::{WalkOutcome, walk_document};
use crate::{classify, matcher, page, text_processing};

/// A configurable score extraction pipeline.
///
/// Holds an [`ExtractorConfig`] and exposes each pipeline step as a method.
/// The default constructor uses built-in defaults; use
/// [`ScoreExtractor::with_config`] to supply custom rules, bounds, page
/// window or strategy order.
///
/// The extractor holds no per-document state, so one instance can serve any
/// number of concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct ScoreExtractor {
    config: ExtractorConfig,
}

impl ScoreExtractor {
    /// Create an extractor with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an extractor with a custom configuration.
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Get a reference to the current config.
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Collapse whitespace (step 1).
    pub fn normalize(&self, text: &str) -> String {
        text_processing::normalize(text)
    }

    /// Pull text out of one page with every configured strategy (step 2).
    pub fn extract_page(&self, page: &dyn DocumentPage, page_index: usize) -> Vec<String> {
        page::extract_page(page, page_index, &self.config.strategies)
    }

    /// Find a score in normalized text (step 3).
    pub fn find_score(&self, text: &str) -> Option<ScoreMatch> {
        matcher::find_score_with_config(text, &self.config)
    }

    /// Open and walk a document without classifying the outcome (step 4).
    pub fn walk(
        &self,
        bytes: &[u8],
        backend: &dyn DocumentBackend,
    ) -> Result<WalkOutcome, DocumentError> {
        walk_document(bytes, backend, &self.config)
    }

    /// Run the full pipeline on a document payload.
    pub fn extract_score(&self, bytes: &[u8], backend: &dyn DocumentBackend) -> ExtractionResult {
        classify::classify(self.walk(bytes, backend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractorConfigBuilder;
    use cibil_core::mock::{MockBackend, MockPage};
    use cibil_core::{ExtractionStrategy, MatchSource, ScanPhase};

    #[test]
    fn test_extractor_default_steps() {
        let ext = ScoreExtractor::new();
        let text = ext.normalize("Your CIBIL\n Score is\n 743");
        assert_eq!(text, "Your CIBIL Score is 743");
        assert_eq!(ext.find_score(&text).unwrap().score, 743);
    }

    #[test]
    fn test_extractor_extract_page() {
        let ext = ScoreExtractor::new();
        let backend = MockBackend::with_pages(vec![
            MockPage::text("plain").with(ExtractionStrategy::RawText, "raw"),
        ]);
        let doc = backend.open(b"x").unwrap();
        let page = doc.load_page(0).unwrap();
        assert_eq!(ext.extract_page(page.as_ref(), 0), vec!["plain", "raw"]);
    }

    #[test]
    fn test_custom_fast_path_window() {
        let pages = vec![
            MockPage::text("Summary"),
            MockPage::text("Your CIBIL Score is 701"),
        ];
        let backend = MockBackend::with_pages(pages);

        let ext = ScoreExtractor::new();
        assert_eq!(
            ext.extract_score(b"x", &backend),
            ExtractionResult::Success {
                score: 701,
                source: MatchSource::Pattern(0),
                phase: ScanPhase::Fast { page: 1 },
            }
        );

        let narrow = ScoreExtractor::with_config(
            ExtractorConfigBuilder::new()
                .fast_path_pages(1)
                .build()
                .unwrap(),
        );
        assert_eq!(
            narrow.extract_score(b"x", &backend),
            ExtractionResult::Success {
                score: 701,
                source: MatchSource::Pattern(0),
                phase: ScanPhase::Full,
            }
        );
    }

    #[test]
    fn test_custom_strategy_subset_ignores_other_strategies() {
        let backend = MockBackend::with_pages(vec![
            MockPage::text("Your CIBIL Score is 701")
                .with(ExtractionStrategy::Markup, "Nothing to see"),
        ]);
        let ext = ScoreExtractor::with_config(
            ExtractorConfigBuilder::new()
                .strategies(vec![ExtractionStrategy::Markup])
                .build()
                .unwrap(),
        );
        assert_eq!(ext.extract_score(b"x", &backend), ExtractionResult::NotFound);
    }
}
