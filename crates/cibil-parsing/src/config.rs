use cibil_core::config_file::ExtractionConfig;
use cibil_core::{ExtractionStrategy, MAX_SCORE, MIN_SCORE};
use regex::Regex;

use crate::ConfigError;

/// Default number of leading pages scanned before the full-document pass.
pub const DEFAULT_FAST_PATH_PAGES: usize = 3;

/// Controls how a list of patterns/values is overridden from its defaults.
#[derive(Debug, Clone, Default)]
pub enum ListOverride<T> {
    /// Use the built-in defaults.
    #[default]
    Default,
    /// Completely replace the defaults with these values.
    Replace(Vec<T>),
    /// Append these values to the defaults.
    Extend(Vec<T>),
}

impl<T: Clone> ListOverride<T> {
    /// Resolve this override against the given defaults.
    pub fn resolve(&self, defaults: &[T]) -> Vec<T> {
        match self {
            ListOverride::Default => defaults.to_vec(),
            ListOverride::Replace(v) => v.clone(),
            ListOverride::Extend(v) => {
                let mut result = defaults.to_vec();
                result.extend(v.iter().cloned());
                result
            }
        }
    }
}

/// Configuration for the score extraction pipeline.
///
/// Use [`ExtractorConfigBuilder`] to construct with string patterns.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    // ── matcher.rs ──
    /// Ordered score rules; each must capture the score digits in group 1.
    pub(crate) rules: ListOverride<Regex>,
    /// Inclusive lower bound of an accepted score.
    pub(crate) min_score: u16,
    /// Inclusive upper bound of an accepted score.
    pub(crate) max_score: u16,
    /// Whether to scan for bare 3-digit runs when no rule matches.
    pub(crate) fallback_scan: bool,

    // ── walker.rs ──
    /// Leading pages tried one by one before aggregating the whole document.
    pub(crate) fast_path_pages: usize,
    /// Strategies in the order they are tried on each page.
    pub(crate) strategies: Vec<ExtractionStrategy>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            rules: ListOverride::Default,
            min_score: MIN_SCORE,
            max_score: MAX_SCORE,
            fallback_scan: true,
            fast_path_pages: DEFAULT_FAST_PATH_PAGES,
            strategies: ExtractionStrategy::ALL.to_vec(),
        }
    }
}

impl ExtractorConfig {
    /// `true` if `score` lies inside the accepted bounds.
    pub fn accepts(&self, score: u32) -> bool {
        (u32::from(self.min_score)..=u32::from(self.max_score)).contains(&score)
    }

    pub fn fast_path_pages(&self) -> usize {
        self.fast_path_pages
    }

    pub fn strategies(&self) -> &[ExtractionStrategy] {
        &self.strategies
    }
}

/// Builder for [`ExtractorConfig`].
///
/// Accepts string patterns that are compiled to `Regex` in [`build()`](Self::build).
/// Fails fast if a pattern is invalid or lacks a capture group, if the score
/// bounds are inverted, or if no strategy is left.
#[derive(Debug, Clone, Default)]
pub struct ExtractorConfigBuilder {
    rules: ListOverride<String>,
    min_score: Option<u16>,
    max_score: Option<u16>,
    fallback_scan: Option<bool>,
    fast_path_pages: Option<usize>,
    strategies: Option<Vec<ExtractionStrategy>>,
}

impl ExtractorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the builder from the `[extraction]` table of a config file.
    pub fn from_file_config(file: &ExtractionConfig) -> Self {
        Self {
            min_score: file.min_score,
            max_score: file.max_score,
            fallback_scan: file.fallback_scan,
            fast_path_pages: file.fast_path_pages,
            strategies: file.strategies.clone(),
            ..Self::default()
        }
    }

    // ── Rules ──

    pub fn set_rules(mut self, patterns: Vec<String>) -> Self {
        self.rules = ListOverride::Replace(patterns);
        self
    }

    pub fn add_rule(mut self, pattern: String) -> Self {
        match &mut self.rules {
            ListOverride::Extend(v) => v.push(pattern),
            _ => self.rules = ListOverride::Extend(vec![pattern]),
        }
        self
    }

    // ── Scalars ──

    pub fn min_score(mut self, score: u16) -> Self {
        self.min_score = Some(score);
        self
    }

    pub fn max_score(mut self, score: u16) -> Self {
        self.max_score = Some(score);
        self
    }

    pub fn fallback_scan(mut self, enabled: bool) -> Self {
        self.fallback_scan = Some(enabled);
        self
    }

    pub fn fast_path_pages(mut self, pages: usize) -> Self {
        self.fast_path_pages = Some(pages);
        self
    }

    pub fn strategies(mut self, strategies: Vec<ExtractionStrategy>) -> Self {
        self.strategies = Some(strategies);
        self
    }

    /// Compile all string patterns into regexes and produce an [`ExtractorConfig`].
    pub fn build(self) -> Result<ExtractorConfig, ConfigError> {
        let compile = |patterns: Vec<String>| -> Result<Vec<Regex>, ConfigError> {
            patterns
                .iter()
                .map(|p| {
                    let re = Regex::new(p)?;
                    if re.captures_len() < 2 {
                        return Err(ConfigError::MissingCaptureGroup(p.clone()));
                    }
                    Ok(re)
                })
                .collect()
        };

        let rules = match self.rules {
            ListOverride::Default => ListOverride::Default,
            ListOverride::Replace(patterns) => ListOverride::Replace(compile(patterns)?),
            ListOverride::Extend(patterns) => ListOverride::Extend(compile(patterns)?),
        };

        let min_score = self.min_score.unwrap_or(MIN_SCORE);
        let max_score = self.max_score.unwrap_or(MAX_SCORE);
        if min_score > max_score {
            return Err(ConfigError::InvalidBounds {
                min: min_score,
                max: max_score,
            });
        }

        let strategies = self
            .strategies
            .unwrap_or_else(|| ExtractionStrategy::ALL.to_vec());
        if strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }

        Ok(ExtractorConfig {
            rules,
            min_score,
            max_score,
            fallback_scan: self.fallback_scan.unwrap_or(true),
            fast_path_pages: self.fast_path_pages.unwrap_or(DEFAULT_FAST_PATH_PAGES),
            strategies,
        })
    }
}
