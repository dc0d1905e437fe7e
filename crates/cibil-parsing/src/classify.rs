use cibil_core::{DocumentError, ExtractionResult, InvalidInputReason, UnreadableReason};

use crate::walker::WalkOutcome;

/// Map a walk (or its open failure) onto the public result taxonomy.
pub fn classify(walk: Result<WalkOutcome, DocumentError>) -> ExtractionResult {
    match walk {
        Err(err) => ExtractionResult::UnreadableDocument {
            reason: err.reason(),
        },
        Ok(WalkOutcome::NoText) => ExtractionResult::UnreadableDocument {
            reason: UnreadableReason::NoExtractableText,
        },
        Ok(WalkOutcome::NoScore) => ExtractionResult::NotFound,
        Ok(WalkOutcome::Found { score, phase }) => ExtractionResult::Success {
            score: score.score,
            source: score.source,
            phase,
        },
    }
}

/// Result for an upload rejected at the boundary, before any document is opened.
pub fn reject(reason: InvalidInputReason) -> ExtractionResult {
    ExtractionResult::InvalidInput { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cibil_core::{MatchSource, ScanPhase, ScoreMatch};

    #[test]
    fn test_open_failures() {
        assert_eq!(
            classify(Err(DocumentError::Empty)),
            ExtractionResult::UnreadableDocument {
                reason: UnreadableReason::Empty
            }
        );
        assert_eq!(
            classify(Err(DocumentError::PasswordProtected)),
            ExtractionResult::UnreadableDocument {
                reason: UnreadableReason::PasswordProtected
            }
        );
        assert_eq!(
            classify(Err(DocumentError::Corrupt("xref broken".into()))),
            ExtractionResult::UnreadableDocument {
                reason: UnreadableReason::Corrupt
            }
        );
    }

    #[test]
    fn test_walk_outcomes() {
        assert_eq!(
            classify(Ok(WalkOutcome::NoText)),
            ExtractionResult::UnreadableDocument {
                reason: UnreadableReason::NoExtractableText
            }
        );
        assert_eq!(classify(Ok(WalkOutcome::NoScore)), ExtractionResult::NotFound);

        let found = WalkOutcome::Found {
            score: ScoreMatch {
                score: 743,
                source: MatchSource::Pattern(0),
            },
            phase: ScanPhase::Fast { page: 0 },
        };
        assert_eq!(
            classify(Ok(found)),
            ExtractionResult::Success {
                score: 743,
                source: MatchSource::Pattern(0),
                phase: ScanPhase::Fast { page: 0 },
            }
        );
    }

    #[test]
    fn test_reject() {
        assert_eq!(
            reject(InvalidInputReason::WrongFileType),
            ExtractionResult::InvalidInput {
                reason: InvalidInputReason::WrongFileType
            }
        );
    }
}
