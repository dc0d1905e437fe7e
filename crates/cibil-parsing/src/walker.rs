//! Two-phase document walk: a cheap scan of the leading pages, then one
//! match over the text of the whole document.

use cibil_core::{DocumentBackend, DocumentError, DocumentHandle, ScanPhase, ScoreMatch};

use crate::config::ExtractorConfig;
use crate::matcher::find_score_with_config;
use crate::page::page_texts;
use crate::text_processing::normalize;

/// What a completed walk found in a readable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    Found { score: ScoreMatch, phase: ScanPhase },
    /// Every page and strategy produced only whitespace.
    NoText,
    /// Text was extracted but nothing matched.
    NoScore,
}

enum WalkState {
    FastScan,
    FullScan,
    Done(WalkOutcome),
}

/// Open `bytes` with `backend` and walk the document.
///
/// Only an open failure is returned as an error. Page and strategy failures
/// degrade to "no text" for that page or strategy. The document handle is
/// owned by this call and released before it returns on every path.
pub fn walk_document(
    bytes: &[u8],
    backend: &dyn DocumentBackend,
    config: &ExtractorConfig,
) -> Result<WalkOutcome, DocumentError> {
    tracing::debug!(bytes = bytes.len(), "opening document");
    let document = backend.open(bytes).inspect_err(|err| {
        tracing::warn!(reason = err.reason().as_str(), error = %err, "failed to open document");
    })?;

    let page_count = document.page_count();
    let mut state = WalkState::FastScan;
    let outcome = loop {
        state = match state {
            WalkState::FastScan => {
                let window = page_count.min(config.fast_path_pages);
                tracing::debug!(page_count, window, "fast scan");
                match fast_scan(document.as_ref(), window, config) {
                    Some(outcome) => WalkState::Done(outcome),
                    None => WalkState::FullScan,
                }
            }
            WalkState::FullScan => {
                tracing::debug!(page_count, "fast scan exhausted, scanning full document");
                WalkState::Done(full_scan(document.as_ref(), page_count, config))
            }
            WalkState::Done(outcome) => break outcome,
        };
    };

    drop(document);
    tracing::trace!("document released");

    match outcome {
        WalkOutcome::Found { score, phase } => tracing::info!(
            score = score.score,
            source = %score.source,
            ?phase,
            "score found"
        ),
        WalkOutcome::NoText => tracing::warn!("no text could be extracted from document"),
        WalkOutcome::NoScore => tracing::info!("no valid score found in document"),
    }

    Ok(outcome)
}

/// Match each strategy's text of each page in `[0, window)` on its own.
fn fast_scan(
    document: &dyn DocumentHandle,
    window: usize,
    config: &ExtractorConfig,
) -> Option<WalkOutcome> {
    for index in 0..window {
        let page = match document.load_page(index) {
            Ok(page) => page,
            Err(err) => {
                tracing::debug!(page = index, error = %err, "failed to load page");
                continue;
            }
        };
        for (strategy, text) in page_texts(page.as_ref(), index, &config.strategies) {
            if let Some(score) = find_score_with_config(&normalize(&text), config) {
                tracing::debug!(page = index, %strategy, "fast scan matched");
                return Some(WalkOutcome::Found {
                    score,
                    phase: ScanPhase::Fast { page: index },
                });
            }
        }
    }
    None
}

/// Aggregate every strategy's text of every page and match once.
fn full_scan(
    document: &dyn DocumentHandle,
    page_count: usize,
    config: &ExtractorConfig,
) -> WalkOutcome {
    let mut aggregate = String::new();
    for index in 0..page_count {
        let page = match document.load_page(index) {
            Ok(page) => page,
            Err(err) => {
                tracing::debug!(page = index, error = %err, "failed to load page");
                continue;
            }
        };
        for (_, text) in page_texts(page.as_ref(), index, &config.strategies) {
            aggregate.push_str(&text);
            aggregate.push(' ');
        }
    }

    let aggregate = normalize(&aggregate);
    if aggregate.is_empty() {
        return WalkOutcome::NoText;
    }
    match find_score_with_config(&aggregate, config) {
        Some(score) => WalkOutcome::Found {
            score,
            phase: ScanPhase::Full,
        },
        None => WalkOutcome::NoScore,
    }
}
