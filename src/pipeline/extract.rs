//! Text extraction: DOCX via `docx-rs`, PDF via `pdf-extract`.
//!
//! Both libraries are synchronous and CPU-bound, so [`extract_text`] moves
//! the work onto the blocking pool. `pdf-extract` (and its font parsers) can
//! panic on malformed glyph tables; the panic is caught and reported as an
//! ordinary extraction failure rather than tearing down the runtime.

use crate::error::SummaryError;
use crate::pipeline::input::{DocumentKind, RawDocument};
use tracing::{debug, info, warn};

/// Extract plain text from a document.
///
/// DOCX output is the document's non-blank paragraphs joined by `\n`;
/// PDF output is the page text with blank lines removed.
pub async fn extract_text(doc: RawDocument) -> Result<String, SummaryError> {
    let file_name = doc.file_name().to_string();
    let kind = doc.kind();

    let text = tokio::task::spawn_blocking(move || extract_text_blocking(&doc))
        .await
        .map_err(|e| SummaryError::Internal(format!("Extraction task panicked: {}", e)))??;

    if text.trim().is_empty() {
        return Err(SummaryError::EmptyDocument { file_name });
    }

    info!("Extracted {} chars from {} '{}'", text.len(), kind, file_name);
    Ok(text)
}

/// Blocking implementation of [`extract_text`].
pub fn extract_text_blocking(doc: &RawDocument) -> Result<String, SummaryError> {
    match doc.kind() {
        DocumentKind::Docx => extract_docx(doc),
        DocumentKind::Pdf => extract_pdf(doc),
    }
}

fn extract_docx(doc: &RawDocument) -> Result<String, SummaryError> {
    let docx = docx_rs::read_docx(doc.bytes()).map_err(|e| SummaryError::ExtractionFailed {
        kind: DocumentKind::Docx,
        file_name: doc.file_name().to_string(),
        detail: e.to_string(),
    })?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            docx_rs::DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect();

    debug!("DOCX '{}': {} non-blank paragraphs", doc.file_name(), paragraphs.len());
    Ok(paragraphs.join("\n"))
}

/// Concatenate the text runs of a paragraph, including runs inside hyperlinks.
pub(crate) fn paragraph_text(para: &docx_rs::Paragraph) -> String {
    let mut out = String::new();
    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run_text(run, &mut out),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for inner in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = inner {
                        push_run_text(run, &mut out);
                    }
                }
            }
            _ => {}
        }
    }
    out
}

fn push_run_text(run: &docx_rs::Run, out: &mut String) {
    for run_child in &run.children {
        if let docx_rs::RunChild::Text(text) = run_child {
            out.push_str(&text.text);
        }
    }
}

fn extract_pdf(doc: &RawDocument) -> Result<String, SummaryError> {
    let bytes = doc.bytes();
    let failed = |detail: String| SummaryError::ExtractionFailed {
        kind: DocumentKind::Pdf,
        file_name: doc.file_name().to_string(),
        detail,
    };

    let raw = match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    })) {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return Err(failed(e.to_string())),
        Err(_panic) => {
            warn!("pdf-extract panicked on '{}'", doc.file_name());
            return Err(failed("PDF parser panicked (malformed font or glyph data)".into()));
        }
    };

    let text = drop_blank_lines(&raw);
    debug!(
        "PDF '{}': {} raw chars -> {} chars",
        doc.file_name(),
        raw.len(),
        text.len()
    );
    Ok(text)
}

/// Remove empty and whitespace-only lines, trimming trailing space on the rest.
fn drop_blank_lines(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
