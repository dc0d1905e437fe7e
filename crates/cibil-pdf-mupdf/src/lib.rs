use mupdf::{Document, Page, TextPage, TextPageFlags};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

use cibil_core::{
    DocumentBackend, DocumentError, DocumentHandle, DocumentPage, ExtractionStrategy, PageError,
};

/// MuPDF-based implementation of [`DocumentBackend`].
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so that the matching pipeline does not transitively
/// depend on it.
///
/// Documents are opened from memory; nothing touches the filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct MupdfBackend;

impl MupdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentBackend for MupdfBackend {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn DocumentHandle>, DocumentError> {
        if bytes.is_empty() {
            return Err(DocumentError::Empty);
        }

        let document = Document::from_bytes(bytes, "application/pdf")
            .map_err(|e| DocumentError::Corrupt(e.to_string()))?;

        if document
            .needs_password()
            .map_err(|e| DocumentError::Corrupt(e.to_string()))?
        {
            return Err(DocumentError::PasswordProtected);
        }

        let page_count = document
            .page_count()
            .map_err(|e| DocumentError::Corrupt(e.to_string()))?;

        Ok(Box::new(MupdfDocument {
            document,
            page_count: usize::try_from(page_count).unwrap_or(0),
        }))
    }
}

/// An open MuPDF document. The underlying `fz_document` is dropped with it.
struct MupdfDocument {
    document: Document,
    page_count: usize,
}

impl DocumentHandle for MupdfDocument {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn load_page(&self, index: usize) -> Result<Box<dyn DocumentPage + '_>, PageError> {
        if index >= self.page_count {
            return Err(PageError::OutOfRange(index));
        }
        let page = self
            .document
            .load_page(index as i32)
            .map_err(|e| PageError::Load {
                page: index,
                message: e.to_string(),
            })?;
        Ok(Box::new(MupdfPage { page }))
    }
}

struct MupdfPage {
    page: Page,
}

impl MupdfPage {
    fn text_page(
        &self,
        strategy: ExtractionStrategy,
        flags: TextPageFlags,
    ) -> Result<TextPage, PageError> {
        self.page
            .to_text_page(flags)
            .map_err(|e| strategy_error(strategy, e))
    }
}

impl DocumentPage for MupdfPage {
    fn text(&self, strategy: ExtractionStrategy) -> Result<String, PageError> {
        match strategy {
            ExtractionStrategy::PlainText => self
                .text_page(strategy, TextPageFlags::empty())?
                .to_text()
                .map_err(|e| strategy_error(strategy, e)),
            ExtractionStrategy::RawText => {
                let text_page = self.text_page(strategy, TextPageFlags::PRESERVE_WHITESPACE)?;
                Ok(raw_text(&text_page))
            }
            ExtractionStrategy::BlockLayout => {
                let text_page = self.text_page(strategy, TextPageFlags::empty())?;
                Ok(block_text(&text_page))
            }
            ExtractionStrategy::WordLayout => {
                let text_page = self.text_page(strategy, TextPageFlags::empty())?;
                Ok(word_text(&text_page))
            }
            ExtractionStrategy::Markup => {
                let html = self
                    .text_page(strategy, TextPageFlags::empty())?
                    .to_html(0, true)
                    .map_err(|e| strategy_error(strategy, e))?;
                Ok(html_body_text(&html))
            }
        }
    }
}

fn strategy_error(strategy: ExtractionStrategy, err: mupdf::Error) -> PageError {
    PageError::Strategy {
        strategy,
        message: err.to_string(),
    }
}

/// Characters in content-stream order, one line per structured-text line.
fn raw_text(text_page: &TextPage) -> String {
    let mut out = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            out.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
            out.push('\n');
        }
    }
    out
}

/// Block/line iteration with a blank line between blocks.
fn block_text(text_page: &TextPage) -> String {
    let mut blocks = Vec::new();
    for block in text_page.blocks() {
        let mut block_text = String::new();
        for line in block.lines() {
            let line_text: String = line
                .chars()
                .map(|c| c.char().unwrap_or('\u{FFFD}'))
                .collect();
            block_text.push_str(&line_text);
            block_text.push('\n');
        }
        blocks.push(block_text);
    }
    blocks.join("\n")
}

/// Whitespace-separated words, one per line.
fn word_text(text_page: &TextPage) -> String {
    let mut out = String::new();
    for block in text_page.blocks() {
        for line in block.lines() {
            let line_text: String = line
                .chars()
                .map(|c| c.char().unwrap_or('\u{FFFD}'))
                .collect();
            for word in line_text.split_whitespace() {
                out.push_str(word);
                out.push('\n');
            }
        }
    }
    out
}

/// Text nodes of an HTML rendering's `<body>`, skipping `<style>` and
/// `<script>` content so layout coordinates never reach the matcher.
fn html_body_text(html: &str) -> String {
    static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").unwrap());

    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();
    for body in document.select(&BODY) {
        for node in body.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let in_ignored = node
                .parent()
                .and_then(|p| p.value().as_element().map(|e| e.name()))
                .is_some_and(|name| name == "style" || name == "script");
            if !in_ignored {
                parts.push(text);
            }
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload() {
        let backend = MupdfBackend::new();
        assert!(matches!(backend.open(b""), Err(DocumentError::Empty)));
    }

    #[test]
    fn test_garbage_payload_is_corrupt() {
        let backend = MupdfBackend::new();
        let result = backend.open(b"this is definitely not a PDF document");
        assert!(matches!(result, Err(DocumentError::Corrupt(_))));
    }

    #[test]
    fn test_html_body_text() {
        let html = r#"<!DOCTYPE html><html><head><style>p{top:512pt}</style></head>
<body><div id="page0" style="width:612pt;height:792pt">
<p style="top:72pt;left:72pt">Your CIBIL Score is</p><p><b>743</b></p>
<style>.x{left:455pt}</style></div></body></html>"#;
        let text = html_body_text(html);
        assert!(text.contains("Your CIBIL Score is"));
        assert!(text.contains("743"));
        assert!(!text.contains("512"));
        assert!(!text.contains("455"));
        assert!(!text.contains("612"));
    }

    #[test]
    fn test_html_entities_decoded() {
        let text = html_body_text("<html><body><p>Score&nbsp;:&#32;801</p></body></html>");
        assert!(text.contains("801"));
        assert!(text.contains("Score"));
        assert!(!text.contains("&nbsp;"));
    }
}
