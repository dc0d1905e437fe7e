use std::fmt;

use serde::{Deserialize, Serialize};

pub mod backend;
pub mod config_file;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use backend::{
    DocumentBackend, DocumentError, DocumentHandle, DocumentPage, ExtractionStrategy, PageError,
};

/// Lowest score accepted on the modelled scoring scale.
pub const MIN_SCORE: u16 = 300;
/// Highest score accepted on the modelled scoring scale.
pub const MAX_SCORE: u16 = 900;

/// Which matcher path produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchSource {
    /// A labelled pattern rule, by 0-based position in the rule list.
    Pattern(usize),
    /// The unlabelled "any in-range 3-digit run" scan.
    DigitFallback,
}

impl MatchSource {
    /// `true` when the score came from the unlabelled digit scan.
    pub fn is_fallback(&self) -> bool {
        matches!(self, MatchSource::DigitFallback)
    }
}

impl fmt::Display for MatchSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchSource::Pattern(i) => write!(f, "rule {}", i + 1),
            MatchSource::DigitFallback => f.write_str("digit fallback"),
        }
    }
}

/// A validated score together with the path that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreMatch {
    pub score: u16,
    pub source: MatchSource,
}

/// Where in the document walk a score was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanPhase {
    /// Found while scanning the leading page window; `page` is 0-based.
    Fast { page: usize },
    /// Found in the aggregated text of the whole document.
    Full,
}

/// Why an upload was rejected before any document was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidInputReason {
    NoFile,
    EmptyFilename,
    WrongFileType,
}

impl InvalidInputReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidInputReason::NoFile => "no-file",
            InvalidInputReason::EmptyFilename => "empty-filename",
            InvalidInputReason::WrongFileType => "wrong-file-type",
        }
    }
}

/// Why a document could not be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnreadableReason {
    Corrupt,
    Empty,
    PasswordProtected,
    Io,
    NoExtractableText,
}

impl UnreadableReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnreadableReason::Corrupt => "corrupt",
            UnreadableReason::Empty => "empty",
            UnreadableReason::PasswordProtected => "password-protected",
            UnreadableReason::Io => "io-error",
            UnreadableReason::NoExtractableText => "no-extractable-text",
        }
    }
}

/// Outcome of one score extraction call.
///
/// This is the only value handed to external collaborators. It never carries
/// extracted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionResult {
    Success {
        score: u16,
        source: MatchSource,
        phase: ScanPhase,
    },
    NotFound,
    InvalidInput {
        reason: InvalidInputReason,
    },
    UnreadableDocument {
        reason: UnreadableReason,
    },
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success { .. })
    }

    /// The extracted score, if any.
    pub fn score(&self) -> Option<u16> {
        match self {
            ExtractionResult::Success { score, .. } => Some(*score),
            _ => None,
        }
    }

    /// Human-readable message for the caller.
    pub fn message(&self) -> &'static str {
        match self {
            ExtractionResult::Success { .. } => "Successfully extracted CIBIL score",
            ExtractionResult::NotFound => {
                "Could not find valid CIBIL score in document. Please ensure this is a CIBIL report PDF."
            }
            ExtractionResult::InvalidInput { reason } => match reason {
                InvalidInputReason::NoFile => "No file uploaded",
                InvalidInputReason::EmptyFilename => "No file selected",
                InvalidInputReason::WrongFileType => {
                    "Please upload a PDF file of your CIBIL report"
                }
            },
            ExtractionResult::UnreadableDocument { reason } => match reason {
                UnreadableReason::Corrupt => "Invalid or corrupted PDF file",
                UnreadableReason::Empty => "The PDF file is empty",
                UnreadableReason::PasswordProtected => {
                    "The PDF file is password protected. Please provide an unprotected PDF."
                }
                UnreadableReason::Io => {
                    "Error processing the PDF file. Please ensure it's a valid CIBIL report."
                }
                UnreadableReason::NoExtractableText => {
                    "Could not extract text from PDF. The file might be scanned or password protected."
                }
            },
        }
    }

    /// Flatten into the `{score, status, message}` record that storage and
    /// transport collaborators consume. Failures report a score of 0.
    pub fn report(&self) -> ScoreReport {
        ScoreReport {
            score: self.score().unwrap_or(0),
            status: if self.is_success() {
                ReportStatus::Success
            } else {
                ReportStatus::Error
            },
            message: self.message().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Success,
    Error,
}

/// Wire/storage form of an [`ExtractionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: u16,
    pub status: ReportStatus,
    pub message: String,
}

/// A long-lived collaborator that records successful extractions.
///
/// Construct one at process start and pass it by reference to whatever
/// needs it; there is no global instance.
pub trait ReportSink: Send + Sync {
    /// Record a report for the document named `source`.
    fn record(&self, source: &str, report: &ScoreReport) -> std::io::Result<()>;
}
