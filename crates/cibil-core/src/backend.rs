use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::UnreadableReason;

/// How text is pulled out of a single page.
///
/// Strategies are independent: a failure in one never affects the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    PlainText,
    RawText,
    BlockLayout,
    WordLayout,
    Markup,
}

impl ExtractionStrategy {
    /// All strategies in priority order.
    pub const ALL: [ExtractionStrategy; 5] = [
        ExtractionStrategy::PlainText,
        ExtractionStrategy::RawText,
        ExtractionStrategy::BlockLayout,
        ExtractionStrategy::WordLayout,
        ExtractionStrategy::Markup,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExtractionStrategy::PlainText => "plain-text",
            ExtractionStrategy::RawText => "raw-text",
            ExtractionStrategy::BlockLayout => "block-layout",
            ExtractionStrategy::WordLayout => "word-layout",
            ExtractionStrategy::Markup => "markup",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure to open a document. Fatal to an extraction call.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("document payload is empty")]
    Empty,
    #[error("document is password protected")]
    PasswordProtected,
    #[error("invalid or corrupted document: {0}")]
    Corrupt(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    /// Map onto the public failure taxonomy.
    pub fn reason(&self) -> UnreadableReason {
        match self {
            DocumentError::Empty => UnreadableReason::Empty,
            DocumentError::PasswordProtected => UnreadableReason::PasswordProtected,
            DocumentError::Corrupt(_) => UnreadableReason::Corrupt,
            DocumentError::Io(_) => UnreadableReason::Io,
        }
    }
}

/// Failure to load a page or run a strategy on it. Never fatal.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("page {0} is out of range")]
    OutOfRange(usize),
    #[error("failed to load page {page}: {message}")]
    Load { page: usize, message: String },
    #[error("{strategy} extraction failed: {message}")]
    Strategy {
        strategy: ExtractionStrategy,
        message: String,
    },
}

/// Trait for document backends.
///
/// Implementors turn an uploaded payload into a paginated [`DocumentHandle`];
/// the walking and matching pipeline lives in `cibil_parsing`.
pub trait DocumentBackend: Send + Sync {
    /// Open `bytes` as a paginated document.
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn DocumentHandle>, DocumentError>;
}

/// An opened document. Dropping the handle releases it.
pub trait DocumentHandle {
    fn page_count(&self) -> usize;

    /// Load the page at 0-based `index`.
    fn load_page(&self, index: usize) -> Result<Box<dyn DocumentPage + '_>, PageError>;
}

/// One loaded page of a [`DocumentHandle`].
pub trait DocumentPage {
    /// Extract this page's text with `strategy`. May return an empty string.
    fn text(&self, strategy: ExtractionStrategy) -> Result<String, PageError>;
}
