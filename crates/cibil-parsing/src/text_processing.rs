use once_cell::sync::Lazy;
use regex::Regex;

/// Collapse every run of whitespace (newlines included) to a single space
/// and trim both ends.
///
/// Idempotent: `normalize(&normalize(t)) == normalize(t)`.
pub fn normalize(text: &str) -> String {
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
    WS_RE.replace_all(text, " ").trim().to_string()
}

/// `true` if `text` has no non-whitespace content.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
