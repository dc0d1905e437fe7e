//! In-memory document backend for testing.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{
    DocumentBackend, DocumentError, DocumentHandle, DocumentPage, ExtractionStrategy, PageError,
};

/// Scripted output of one strategy on a [`MockPage`].
#[derive(Clone, Debug)]
enum MockText {
    Text(String),
    Fail(String),
}

/// A page whose per-strategy output is fixed up front.
///
/// Strategies with no scripted output return an empty string.
#[derive(Clone, Debug, Default)]
pub struct MockPage {
    outputs: HashMap<ExtractionStrategy, MockText>,
    unloadable: bool,
}

impl MockPage {
    /// A page with no text under any strategy.
    pub fn blank() -> Self {
        Self::default()
    }

    /// A page whose plain-text strategy returns `text`.
    pub fn text(text: &str) -> Self {
        Self::blank().with(ExtractionStrategy::PlainText, text)
    }

    /// Script `strategy` to return `text`.
    pub fn with(mut self, strategy: ExtractionStrategy, text: &str) -> Self {
        self.outputs
            .insert(strategy, MockText::Text(text.to_string()));
        self
    }

    /// Script `strategy` to fail.
    pub fn failing(mut self, strategy: ExtractionStrategy) -> Self {
        self.outputs.insert(
            strategy,
            MockText::Fail(format!("scripted {} failure", strategy)),
        );
        self
    }

    /// A page that cannot be loaded at all.
    pub fn unloadable() -> Self {
        Self {
            unloadable: true,
            ..Self::default()
        }
    }
}

/// Scripted open failure for [`MockBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockOpenFailure {
    Corrupt,
    PasswordProtected,
}

#[derive(Debug, Default)]
struct Counters {
    open_attempts: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
    pages_loaded: AtomicUsize,
}

/// A hand-rolled mock implementing [`DocumentBackend`] for tests.
///
/// Every successful [`open`](DocumentBackend::open) hands out a fresh handle
/// over the same scripted pages. Open attempts, successful opens, closes and
/// page loads are counted so tests can check resource release.
/// Like a real backend, an empty payload always fails with
/// [`DocumentError::Empty`].
pub struct MockBackend {
    pages: Arc<Vec<MockPage>>,
    failure: Option<MockOpenFailure>,
    counters: Arc<Counters>,
}

impl MockBackend {
    /// A backend that opens every non-empty payload as `pages`.
    pub fn with_pages(pages: Vec<MockPage>) -> Self {
        Self {
            pages: Arc::new(pages),
            failure: None,
            counters: Arc::new(Counters::default()),
        }
    }

    /// A backend that fails to open every non-empty payload.
    pub fn failing(failure: MockOpenFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Self::with_pages(Vec::new())
        }
    }

    pub fn open_attempts(&self) -> usize {
        self.counters.open_attempts.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.counters.closed.load(Ordering::SeqCst)
    }

    pub fn pages_loaded(&self) -> usize {
        self.counters.pages_loaded.load(Ordering::SeqCst)
    }

    /// Handles opened but not yet dropped.
    pub fn live_handles(&self) -> usize {
        self.opened() - self.closed()
    }
}

impl DocumentBackend for MockBackend {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn DocumentHandle>, DocumentError> {
        self.counters.open_attempts.fetch_add(1, Ordering::SeqCst);
        if bytes.is_empty() {
            return Err(DocumentError::Empty);
        }
        match self.failure {
            Some(MockOpenFailure::Corrupt) => {
                Err(DocumentError::Corrupt("scripted corrupt payload".into()))
            }
            Some(MockOpenFailure::PasswordProtected) => Err(DocumentError::PasswordProtected),
            None => {
                self.counters.opened.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(MockHandle {
                    pages: Arc::clone(&self.pages),
                    counters: Arc::clone(&self.counters),
                }))
            }
        }
    }
}

struct MockHandle {
    pages: Arc<Vec<MockPage>>,
    counters: Arc<Counters>,
}

impl DocumentHandle for MockHandle {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn load_page(&self, index: usize) -> Result<Box<dyn DocumentPage + '_>, PageError> {
        let page = self.pages.get(index).ok_or(PageError::OutOfRange(index))?;
        if page.unloadable {
            return Err(PageError::Load {
                page: index,
                message: "scripted load failure".into(),
            });
        }
        self.counters.pages_loaded.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(page))
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
    }
}

impl DocumentPage for &MockPage {
    fn text(&self, strategy: ExtractionStrategy) -> Result<String, PageError> {
        match self.outputs.get(&strategy) {
            Some(MockText::Text(t)) => Ok(t.clone()),
            Some(MockText::Fail(message)) => Err(PageError::Strategy {
                strategy,
                message: message.clone(),
            }),
            None => Ok(String::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_open_and_close() {
        let backend = MockBackend::with_pages(vec![MockPage::text("hello")]);
        {
            let handle = backend.open(b"%PDF-").unwrap();
            assert_eq!(handle.page_count(), 1);
            assert_eq!(backend.live_handles(), 1);
        }
        assert_eq!(backend.open_attempts(), 1);
        assert_eq!(backend.closed(), 1);
        assert_eq!(backend.live_handles(), 0);
    }

    #[test]
    fn test_empty_payload_is_rejected() {
        let backend = MockBackend::with_pages(vec![MockPage::text("hello")]);
        assert!(matches!(backend.open(b""), Err(DocumentError::Empty)));
        assert_eq!(backend.opened(), 0);
    }

    #[test]
    fn test_scripted_strategies() {
        let backend = MockBackend::with_pages(vec![
            MockPage::text("plain")
                .with(ExtractionStrategy::Markup, "markup")
                .failing(ExtractionStrategy::RawText),
        ]);
        let handle = backend.open(b"x").unwrap();
        let page = handle.load_page(0).unwrap();
        assert_eq!(page.text(ExtractionStrategy::PlainText).unwrap(), "plain");
        assert_eq!(page.text(ExtractionStrategy::Markup).unwrap(), "markup");
        assert_eq!(page.text(ExtractionStrategy::WordLayout).unwrap(), "");
        assert!(page.text(ExtractionStrategy::RawText).is_err());
        assert!(handle.load_page(1).is_err());
    }
}
