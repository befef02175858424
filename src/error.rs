//! Error types for the minutes-audit library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`SummaryError`] — **Fatal**: the request cannot proceed at all
//!   (unsupported file, unreadable document, model call failed). Returned as
//!   `Err(SummaryError)` from the top-level `summarize*` functions and aborts
//!   every remaining pipeline step.
//!
//! * [`TableError`] — **Non-fatal**: the model answered, but its answer did
//!   not contain a usable table. Stored in
//!   [`crate::output::SummaryOutput::warning`] so callers still get the raw
//!   summary text while the `.docx` export is skipped.

use crate::pipeline::input::DocumentKind;
use std::path::PathBuf;
use thiserror::Error;

/// Message shown to the user when the response held no table.
pub const NO_TABLE_MESSAGE: &str = "Could not generate downloadable summary.";

/// Coarse grouping of [`SummaryError`] variants.
///
/// Lets front ends branch on the failure class without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// File extension not recognised, or the file cannot be opened.
    UnsupportedInput,
    /// Text could not be pulled out of the document.
    Extraction,
    /// Provider missing, API error, timeout.
    Model,
    /// The `.docx` could not be built or written.
    Export,
    /// Bad configuration or an internal bug.
    Config,
}

/// All fatal errors returned by the minutes-audit library.
#[derive(Debug, Error)]
pub enum SummaryError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Extension is neither `.docx` nor `.pdf`.
    #[error("Unsupported file type: '{file_name}'\nOnly .docx and .pdf files are accepted.")]
    UnsupportedFileType { file_name: String },

    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Extraction errors ─────────────────────────────────────────────────
    /// The DOCX/PDF library rejected the document.
    #[error("Failed to extract text from {kind} '{file_name}': {detail}")]
    ExtractionFailed {
        kind: DocumentKind,
        file_name: String,
        detail: String,
    },

    /// Extraction succeeded but produced no text at all.
    #[error("No text found in '{file_name}' (scanned or image-only documents are not supported)")]
    EmptyDocument { file_name: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// No credential was configured and none could be detected.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The LLM API rejected the credential (401/403).
    #[error("Authentication error from provider '{provider}': {detail}")]
    AuthError { provider: String, detail: String },

    /// The model call did not finish within the configured timeout.
    #[error("LLM call timed out after {secs}s")]
    ApiTimeout { secs: u64 },

    /// The model answered with nothing but whitespace.
    #[error("LLM returned an empty response")]
    EmptyResponse,

    // ── Export errors ─────────────────────────────────────────────────────
    /// docx-rs failed to pack or read the document.
    #[error("Failed to build Word document: {0}")]
    ExportFailed(String),

    /// Could not create or write the output `.docx` file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed, or a secrets file is malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SummaryError {
    /// Which group this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SummaryError::UnsupportedFileType { .. }
            | SummaryError::FileNotFound { .. }
            | SummaryError::PermissionDenied { .. } => ErrorKind::UnsupportedInput,
            SummaryError::ExtractionFailed { .. } | SummaryError::EmptyDocument { .. } => {
                ErrorKind::Extraction
            }
            SummaryError::ProviderNotConfigured { .. }
            | SummaryError::LlmApiError { .. }
            | SummaryError::AuthError { .. }
            | SummaryError::ApiTimeout { .. }
            | SummaryError::EmptyResponse => ErrorKind::Model,
            SummaryError::ExportFailed(_) | SummaryError::OutputWriteFailed { .. } => {
                ErrorKind::Export
            }
            SummaryError::InvalidConfig(_) | SummaryError::Internal(_) => ErrorKind::Config,
        }
    }

    /// The message a front end should show for this error.
    ///
    /// Unsupported files get a short fixed message; everything else is
    /// reported generically with the underlying error appended.
    pub fn user_message(&self) -> String {
        match self {
            SummaryError::UnsupportedFileType { .. } => "Unsupported file type.".to_string(),
            other => format!("Something went wrong: {other}"),
        }
    }
}

/// A non-fatal problem with the table in the model's answer.
///
/// The summary text is still returned; only the `.docx` export is skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum TableError {
    /// No line of the response looked like a table row.
    #[error("no markdown table found in the summary")]
    NoTable,

    /// A data row's cell count differs from the header's (strict mode only).
    #[error("row {row} has {found} cells but the header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}
