use cibil_core::{MatchSource, ScoreMatch};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ExtractorConfig;

/// Built-in score rules, most specific label first.
///
/// Each rule captures the score digits in group 1. Matching is
/// case-insensitive and tolerant of missing or repeated whitespace, which is
/// common in text pulled from PDF layouts.
static DEFAULT_RULES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // "Your CIBIL Score is 743"
        r"(?i)cibil\s*score\s*is\s*([0-9]{3})",
        // "Score is 743"
        r"(?i)score\s*is\s*([0-9]{3})",
        // "Score: 743", "Score - 743"
        r"(?i)score\s*[:\-]\s*([0-9]{3})",
        // "743 as of Date"
        r"(?i)([0-9]{3})\s*as\s*of\s*date",
        // "Score 743", "Score:743"
        r"(?i)score\s*[:\-]?\s*([0-9]{3})",
        // "CIBIL Score 743"
        r"(?i)cibil\s*score\s*[:\-]?\s*([0-9]{3})",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static DIGIT_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());

/// Find a score in normalized text using the built-in rules and bounds.
pub fn find_score(text: &str) -> Option<ScoreMatch> {
    find_score_with_config(text, &ExtractorConfig::default())
}

/// Config-aware version of [`find_score`].
///
/// Rules are tried in order. For each rule only its first match in the text is
/// considered; an out-of-range value moves on to the next rule rather than the
/// next match. When no rule yields an in-range value, the digit fallback
/// returns the first run of exactly three digits that is in range.
pub(crate) fn find_score_with_config(text: &str, config: &ExtractorConfig) -> Option<ScoreMatch> {
    let rules = config.rules.resolve(&DEFAULT_RULES);

    for (index, rule) in rules.iter().enumerate() {
        let Some(caps) = rule.captures(text) else {
            tracing::trace!(rule = index + 1, "pattern not found");
            continue;
        };
        let Some(score) = caps.get(1).and_then(|m| m.as_str().parse::<u32>().ok()) else {
            continue;
        };
        if config.accepts(score) {
            return Some(ScoreMatch {
                score: score as u16,
                source: MatchSource::Pattern(index),
            });
        }
        tracing::trace!(rule = index + 1, score, "candidate outside valid range");
    }

    if !config.fallback_scan {
        return None;
    }

    // Unlabelled: page numbers, amounts or fragments of dates can win here.
    DIGIT_RUN_RE
        .find_iter(text)
        .filter(|m| m.as_str().len() == 3)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .find(|&score| config.accepts(score))
        .map(|score| ScoreMatch {
            score: score as u16,
            source: MatchSource::DigitFallback,
        })
}
