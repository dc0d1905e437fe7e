use std::io::Write;

use cibil_core::{ExtractionResult, ScanPhase, ScoreReport};
use cibil_ingest::IngestError;
use owo_colors::OwoColorize;
use serde::Serialize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// One line of `--json` output.
#[derive(Serialize)]
struct FileReport<'a> {
    file: &'a str,
    #[serde(flatten)]
    report: ScoreReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fallback: Option<bool>,
}

fn file_report<'a>(file: &'a str, result: &ExtractionResult) -> FileReport<'a> {
    let mut out = FileReport {
        file,
        report: result.report(),
        reason: None,
        rule: None,
        page: None,
        fallback: None,
    };
    match result {
        ExtractionResult::Success { source, phase, .. } => {
            out.rule = Some(source.to_string());
            out.fallback = Some(source.is_fallback());
            if let ScanPhase::Fast { page } = phase {
                out.page = Some(page + 1);
            }
        }
        ExtractionResult::NotFound => out.reason = Some("not-found"),
        ExtractionResult::InvalidInput { reason } => out.reason = Some(reason.as_str()),
        ExtractionResult::UnreadableDocument { reason } => out.reason = Some(reason.as_str()),
    }
    out
}

/// Print a result as a single JSON line.
pub fn print_json(w: &mut dyn Write, file: &str, result: &ExtractionResult) -> std::io::Result<()> {
    let line = serde_json::to_string(&file_report(file, result)).map_err(std::io::Error::other)?;
    writeln!(w, "{}", line)
}

/// Print a failure to read `file` as a single JSON line.
pub fn print_json_error(w: &mut dyn Write, file: &str, err: &IngestError) -> std::io::Result<()> {
    let line = serde_json::json!({
        "file": file,
        "score": 0,
        "status": "error",
        "message": err.to_string(),
        "reason": err.reason(),
    });
    writeln!(w, "{}", line)
}

/// Print a human-readable result line.
pub fn print_result(
    w: &mut dyn Write,
    file: &str,
    result: &ExtractionResult,
    color: ColorMode,
) -> std::io::Result<()> {
    match result {
        ExtractionResult::Success {
            score,
            source,
            phase,
        } => {
            let location = match phase {
                ScanPhase::Fast { page } => format!("page {}", page + 1),
                ScanPhase::Full => "full document".to_string(),
            };
            if color.enabled() {
                write!(w, "{}: {}", file.bold(), score.bold().green())?;
                write!(w, " {}", format!("({}, {})", source, location).dimmed())?;
                if source.is_fallback() {
                    write!(w, " {}", "unlabelled number, verify manually".yellow())?;
                }
            } else {
                write!(w, "{}: {} ({}, {})", file, score, source, location)?;
                if source.is_fallback() {
                    write!(w, " unlabelled number, verify manually")?;
                }
            }
            writeln!(w)
        }
        _ => print_error(w, file, result.message(), color),
    }
}

/// Print a human-readable failure line.
pub fn print_error(
    w: &mut dyn Write,
    file: &str,
    message: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{}: {}", file.bold(), message.red())
    } else {
        writeln!(w, "{}: {}", file, message)
    }
}
