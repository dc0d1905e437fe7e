use std::path::Path;

use thiserror::Error;

use cibil_core::{DocumentBackend, InvalidInputReason};
use cibil_parsing::ScoreExtractor;

// Re-export domain types for convenience
pub use cibil_core::{ExtractionResult, ScoreReport};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(not(feature = "pdf"))]
    #[error("PDF support not compiled in (enable the `pdf` feature of cibil-ingest)")]
    NoPdfSupport,
}

impl IngestError {
    /// Short machine-readable reason, in the style of [`cibil_core::UnreadableReason::as_str`].
    pub fn reason(&self) -> &'static str {
        match self {
            IngestError::Io(_) => "io-error",
            #[cfg(not(feature = "pdf"))]
            IngestError::NoPdfSupport => "no-pdf-support",
        }
    }
}

/// An uploaded document as received at the boundary.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Read a file from disk as if it had been uploaded under its own name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self { filename, data })
    }
}

/// Boundary checks, in precedence order: missing upload, blank filename,
/// non-`.pdf` extension.
pub fn validate_upload(upload: Option<&Upload>) -> Result<&Upload, InvalidInputReason> {
    let upload = upload.ok_or(InvalidInputReason::NoFile)?;
    if upload.filename.trim().is_empty() {
        return Err(InvalidInputReason::EmptyFilename);
    }
    if !upload.filename.to_lowercase().ends_with(".pdf") {
        return Err(InvalidInputReason::WrongFileType);
    }
    Ok(upload)
}

/// Validate an upload and, if it passes, extract its score with `backend`.
pub fn extract_upload(
    upload: Option<&Upload>,
    extractor: &ScoreExtractor,
    backend: &dyn DocumentBackend,
) -> ExtractionResult {
    match validate_upload(upload) {
        Ok(upload) => {
            tracing::debug!(filename = %upload.filename, bytes = upload.data.len(), "processing upload");
            extractor.extract_score(&upload.data, backend)
        }
        Err(reason) => {
            tracing::info!(reason = reason.as_str(), "upload rejected");
            cibil_parsing::reject(reason)
        }
    }
}

/// Read `path` and extract its score with the MuPDF backend.
///
/// Only a failure to read the file is an error; everything about the
/// document itself is reported through the [`ExtractionResult`].
pub fn extract_file(path: &Path, extractor: &ScoreExtractor) -> Result<ExtractionResult, IngestError> {
    let upload = Upload::from_path(path)?;
    extract_pdf(&upload, extractor)
}

#[cfg(feature = "pdf")]
fn extract_pdf(upload: &Upload, extractor: &ScoreExtractor) -> Result<ExtractionResult, IngestError> {
    let backend = cibil_pdf_mupdf::MupdfBackend::default();
    Ok(extract_upload(Some(upload), extractor, &backend))
}

#[cfg(not(feature = "pdf"))]
fn extract_pdf(_upload: &Upload, _extractor: &ScoreExtractor) -> Result<ExtractionResult, IngestError> {
    Err(IngestError::NoPdfSupport)
}
