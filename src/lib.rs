//! # minutes-audit
//!
//! Turn board meeting minutes into an audit-ready summary table.
//!
//! ## Why this crate?
//!
//! Auditors reading a year of board minutes care about a handful of things
//! per meeting: what was decided, who owns it, when it is due, and what it
//! means financially. This crate extracts the text of a minutes document
//! (`.docx` or `.pdf`), asks a language model to condense it into a fixed
//! markdown table, and exports that table as a Word document that can be
//! dropped straight into an audit file.
//!
//! ## Pipeline Overview
//!
//! ```text
//! minutes.docx / minutes.pdf
//!  │
//!  ├─ 1. Input     pick DOCX or PDF from the file extension
//!  ├─ 2. Extract   plain text (docx-rs / pdf-extract, spawn_blocking)
//!  ├─ 3. Model     one chat call, temperature 0.3, bounded by a timeout
//!  ├─ 4. Clean     strip code fences and invisible characters
//!  ├─ 5. Parse     markdown table → rectangular Table
//!  └─ 6. Export    Table → audit_summary.docx
//! ```
//!
//! A missing table is not an error: the summary text is still returned and
//! [`SummaryOutput::warning`] says why no document was produced.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use minutes_audit::{summarize_to_file, SummaryConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SummaryConfig::builder()
//!         .api_key(std::env::var("OPENAI_API_KEY")?)
//!         .build()?;
//!     let output = summarize_to_file("minutes.pdf", "audit_summary.docx", &config).await?;
//!     println!("{}", output.markdown);
//!     if let Some(msg) = output.warning_message() {
//!         eprintln!("{msg}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `minutes2docx` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! minutes-audit = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod summarize;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{Secrets, SummaryConfig, SummaryConfigBuilder};
pub use error::{ErrorKind, SummaryError, TableError};
pub use output::{SourceInfo, SummaryOutput, SummaryStats};
pub use pipeline::export::{read_docx_table, read_docx_title, render_docx, ExportedDocument};
pub use pipeline::input::{DocumentKind, RawDocument};
pub use pipeline::table::{parse_table, RowPolicy, Table};
pub use progress::{NoopProgressCallback, PipelineProgressCallback, ProgressCallback, Stage};
pub use provider::resolve_provider;
pub use summarize::{
    extract_only, summarize_bytes, summarize_document, summarize_file, summarize_sync,
    summarize_to_file,
};
