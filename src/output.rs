//! Result types returned by the summarisation entry points.

use crate::error::{TableError, NO_TABLE_MESSAGE};
use crate::pipeline::export::ExportedDocument;
use crate::pipeline::input::DocumentKind;
use crate::pipeline::table::Table;
use serde::{Deserialize, Serialize};

/// Everything one request produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryOutput {
    /// The model's answer after cleanup; shown to the user as-is.
    pub markdown: String,
    /// The table parsed from `markdown`, if there was one.
    pub table: Option<Table>,
    /// The `.docx` export, present exactly when `table` is.
    pub document: Option<ExportedDocument>,
    /// Why `table`/`document` are missing.
    pub warning: Option<TableError>,
    /// What was summarised.
    pub source: SourceInfo,
    pub stats: SummaryStats,
}

impl SummaryOutput {
    /// The soft warning to show when no document could be produced.
    pub fn warning_message(&self) -> Option<String> {
        self.warning.as_ref().map(|w| match w {
            TableError::NoTable => NO_TABLE_MESSAGE.to_string(),
            other => format!("{NO_TABLE_MESSAGE} ({other})"),
        })
    }
}

/// The uploaded document, minus its bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub file_name: String,
    pub kind: DocumentKind,
    pub size_bytes: usize,
    /// Characters of text extracted and embedded in the prompt.
    pub extracted_chars: usize,
}

/// Token usage and per-stage timings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub extract_duration_ms: u64,
    pub llm_duration_ms: u64,
    pub export_duration_ms: u64,
    pub total_duration_ms: u64,
}
