use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use cibil_core::{ReportSink, ScoreReport};
use serde::Serialize;

/// Appends one JSON object per recorded report to a file.
pub struct JsonLinesSink {
    file: Mutex<File>,
}

#[derive(Serialize)]
struct Entry<'a> {
    source: &'a str,
    timestamp: u64,
    #[serde(flatten)]
    report: &'a ScoreReport,
}

impl JsonLinesSink {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ReportSink for JsonLinesSink {
    fn record(&self, source: &str, report: &ScoreReport) -> std::io::Result<()> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let line = serde_json::to_string(&Entry {
            source,
            timestamp,
            report,
        })
        .map_err(std::io::Error::other)?;

        let mut file = self
            .file
            .lock()
            .map_err(|_| std::io::Error::other("report log lock poisoned"))?;
        writeln!(file, "{}", line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cibil_core::{ExtractionResult, MatchSource, ScanPhase};

    #[test]
    fn test_appends_one_line_per_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.jsonl");
        let report = ExtractionResult::Success {
            score: 743,
            source: MatchSource::Pattern(0),
            phase: ScanPhase::Fast { page: 0 },
        }
        .report();

        let sink = JsonLinesSink::open(&path).unwrap();
        sink.record("a.pdf", &report).unwrap();
        sink.record("b.pdf", &report).unwrap();
        drop(sink);

        // Reopening appends rather than truncating
        let sink = JsonLinesSink::open(&path).unwrap();
        sink.record("c.pdf", &report).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["source"], "a.pdf");
        assert_eq!(first["score"], 743);
        assert_eq!(first["status"], "success");
        assert!(first["timestamp"].as_u64().unwrap() > 0);
    }
}
