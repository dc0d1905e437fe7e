use cibil_core::{DocumentPage, ExtractionStrategy};

use crate::text_processing::is_blank;

/// Lazily run `strategies` on `page` in order, yielding each non-blank result.
///
/// A failing strategy is logged and skipped; it never stops the remaining
/// strategies. Results are not deduplicated across strategies.
pub fn page_texts<'a>(
    page: &'a dyn DocumentPage,
    page_index: usize,
    strategies: &'a [ExtractionStrategy],
) -> impl Iterator<Item = (ExtractionStrategy, String)> + 'a {
    strategies
        .iter()
        .filter_map(move |&strategy| match page.text(strategy) {
            Ok(text) if is_blank(&text) => {
                tracing::trace!(page = page_index, %strategy, "strategy produced no text");
                None
            }
            Ok(text) => {
                tracing::trace!(page = page_index, %strategy, chars = text.len(), "strategy produced text");
                Some((strategy, text))
            }
            Err(err) => {
                tracing::debug!(page = page_index, %strategy, error = %err, "strategy failed");
                None
            }
        })
}

/// Run every strategy on `page` and collect the non-blank results in order.
pub fn extract_page(
    page: &dyn DocumentPage,
    page_index: usize,
    strategies: &[ExtractionStrategy],
) -> Vec<String> {
    page_texts(page, page_index, strategies)
        .map(|(_, text)| text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cibil_core::DocumentBackend;
    use cibil_core::mock::{MockBackend, MockPage};

    #[test]
    fn test_collects_in_strategy_order() {
        let backend = MockBackend::with_pages(vec![
            MockPage::blank()
                .with(ExtractionStrategy::Markup, "markup text")
                .with(ExtractionStrategy::PlainText, "plain text")
                .with(ExtractionStrategy::WordLayout, "word\ntext"),
        ]);
        let doc = backend.open(b"x").unwrap();
        let page = doc.load_page(0).unwrap();
        let texts = extract_page(page.as_ref(), 0, &ExtractionStrategy::ALL);
        assert_eq!(texts, vec!["plain text", "word\ntext", "markup text"]);
    }

    #[test]
    fn test_failing_strategy_does_not_abort_page() {
        let backend = MockBackend::with_pages(vec![
            MockPage::blank()
                .failing(ExtractionStrategy::PlainText)
                .failing(ExtractionStrategy::RawText)
                .with(ExtractionStrategy::BlockLayout, "block text"),
        ]);
        let doc = backend.open(b"x").unwrap();
        let page = doc.load_page(0).unwrap();
        let texts = extract_page(page.as_ref(), 0, &ExtractionStrategy::ALL);
        assert_eq!(texts, vec!["block text"]);
    }

    #[test]
    fn test_whitespace_only_is_skipped() {
        let backend = MockBackend::with_pages(vec![
            MockPage::text("  \n\t ").with(ExtractionStrategy::RawText, "raw"),
        ]);
        let doc = backend.open(b"x").unwrap();
        let page = doc.load_page(0).unwrap();
        let texts = extract_page(page.as_ref(), 0, &ExtractionStrategy::ALL);
        assert_eq!(texts, vec!["raw"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let backend = MockBackend::with_pages(vec![
            MockPage::text("same").with(ExtractionStrategy::RawText, "same"),
        ]);
        let doc = backend.open(b"x").unwrap();
        let page = doc.load_page(0).unwrap();
        let texts = extract_page(page.as_ref(), 0, &ExtractionStrategy::ALL);
        assert_eq!(texts, vec!["same", "same"]);
    }

    #[test]
    fn test_respects_configured_subset() {
        let backend = MockBackend::with_pages(vec![
            MockPage::text("plain").with(ExtractionStrategy::Markup, "markup"),
        ]);
        let doc = backend.open(b"x").unwrap();
        let page = doc.load_page(0).unwrap();
        let texts = extract_page(page.as_ref(), 0, &[ExtractionStrategy::Markup]);
        assert_eq!(texts, vec!["markup"]);
    }
}
