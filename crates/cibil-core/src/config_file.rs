use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::ExtractionStrategy;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub fast_path_pages: Option<usize>,
    pub min_score: Option<u16>,
    pub max_score: Option<u16>,
    pub fallback_scan: Option<bool>,
    pub strategies: Option<Vec<ExtractionStrategy>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub color: Option<bool>,
    pub report_log: Option<String>,
}

/// Platform config directory path: `<config_dir>/cibil/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cibil").join("config.toml"))
}

/// Load config by cascading CWD `.cibil.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".cibil.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let be = base.extraction.unwrap_or_default();
    let oe = overlay.extraction.unwrap_or_default();
    let bo = base.output.unwrap_or_default();
    let oo = overlay.output.unwrap_or_default();

    ConfigFile {
        extraction: Some(ExtractionConfig {
            fast_path_pages: oe.fast_path_pages.or(be.fast_path_pages),
            min_score: oe.min_score.or(be.min_score),
            max_score: oe.max_score.or(be.max_score),
            fallback_scan: oe.fallback_scan.or(be.fallback_scan),
            strategies: oe.strategies.or(be.strategies),
        }),
        output: Some(OutputConfig {
            color: oo.color.or(bo.color),
            report_log: oo.report_log.or(bo.report_log),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategies_parse_kebab_case() {
        let toml_str = "[extraction]\nstrategies = [\"plain-text\", \"markup\"]\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(
            parsed.extraction.unwrap().strategies.unwrap(),
            vec![ExtractionStrategy::PlainText, ExtractionStrategy::Markup]
        );
    }

    #[test]
    fn test_absent_tables_deserialize_as_none() {
        let parsed: ConfigFile = toml::from_str("").unwrap();
        assert!(parsed.extraction.is_none());
        assert!(parsed.output.is_none());
    }

    #[test]
    fn test_merge_overlay_wins() {
        let base = ConfigFile {
            extraction: Some(ExtractionConfig {
                fast_path_pages: Some(5),
                min_score: Some(350),
                ..Default::default()
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            extraction: Some(ExtractionConfig {
                fast_path_pages: Some(2),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay).extraction.unwrap();
        assert_eq!(merged.fast_path_pages, Some(2));
        assert_eq!(merged.min_score, Some(350));
    }

    #[test]
    fn test_merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            output: Some(OutputConfig {
                report_log: Some("/tmp/scores.jsonl".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(
            merged.output.unwrap().report_log.unwrap(),
            "/tmp/scores.jsonl"
        );
    }

    #[test]
    fn test_load_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[extraction]\nfast_path_pages = 4\n").unwrap();
        let config = load_from_path(&path).unwrap();
        assert_eq!(config.extraction.unwrap().fast_path_pages, Some(4));
    }

    #[test]
    fn test_load_from_path_rejects_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[extraction\nfast_path_pages = ").unwrap();
        assert!(load_from_path(&path).is_none());
        assert!(load_from_path(&dir.path().join("missing.toml")).is_none());
    }
}
