//! Orchestration: run the pipeline stages in order for one document.
//!
//! Every entry point handles exactly one request to completion. Any fatal
//! error aborts the remaining stages and is returned as-is; a response
//! without a usable table is not fatal and comes back as
//! [`SummaryOutput::warning`] with the summary text intact.

use crate::config::SummaryConfig;
use crate::error::SummaryError;
use crate::output::{SourceInfo, SummaryOutput, SummaryStats};
use crate::pipeline::export::{render_docx, ExportedDocument};
use crate::pipeline::input::{read_document, RawDocument};
use crate::pipeline::{extract, llm, postprocess, table};
use crate::progress::{ProgressCallback, Stage};
use crate::provider::resolve_provider;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Summarise a local `.docx` or `.pdf` file.
///
/// # Errors
/// Returns `Err(SummaryError)` for unsupported or unreadable input,
/// extraction failure, and any model failure (including timeout).
/// A missing table is reported through [`SummaryOutput::warning`] instead.
pub async fn summarize_file(
    path: impl AsRef<Path>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let path = path.as_ref();
    info!("Starting summary: {}", path.display());
    let doc = read_document(path).await?;
    summarize_document(doc, config).await
}

/// Summarise an in-memory upload. `file_name` decides the document kind.
///
/// # Example
/// ```rust,no_run
/// use minutes_audit::{summarize_bytes, SummaryConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("minutes.docx")?;
/// let config = SummaryConfig::builder().api_key("sk-...").build()?;
/// let output = summarize_bytes("minutes.docx", bytes, &config).await?;
/// println!("{}", output.markdown);
/// # Ok(())
/// # }
/// ```
pub async fn summarize_bytes(
    file_name: impl Into<String>,
    bytes: Vec<u8>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let doc = RawDocument::from_bytes(file_name, bytes)?;
    summarize_document(doc, config).await
}

/// Run extraction, the model call, parsing, and export for one document.
pub async fn summarize_document(
    doc: RawDocument,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let total_start = Instant::now();
    let cb = config.progress_callback.as_ref();

    let mut source = SourceInfo {
        file_name: doc.file_name().to_string(),
        kind: doc.kind(),
        size_bytes: doc.len(),
        extracted_chars: 0,
    };

    // ── Step 1: Get/create provider ──────────────────────────────────────
    let provider = resolve_provider(config)?;

    // ── Step 2: Extract text ─────────────────────────────────────────────
    stage_start(cb, Stage::Extract);
    let extract_start = Instant::now();
    let minutes = extract::extract_text(doc)
        .await
        .map_err(|e| stage_failed(cb, Stage::Extract, e))?;
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;
    source.extracted_chars = minutes.chars().count();
    stage_complete(cb, Stage::Extract, extract_duration_ms);

    // ── Step 3: Build prompt and call the model ──────────────────────────
    stage_start(cb, Stage::Summarize);
    let llm_start = Instant::now();
    let prompt = llm::prompt_for(&minutes, config);
    let response = llm::summarize(provider.as_ref(), &prompt, config)
        .await
        .map_err(|e| stage_failed(cb, Stage::Summarize, e))?;
    let llm_duration_ms = llm_start.elapsed().as_millis() as u64;
    stage_complete(cb, Stage::Summarize, llm_duration_ms);

    let markdown = postprocess::clean_summary(&response.content);

    // ── Step 4: Parse the table ──────────────────────────────────────────
    stage_start(cb, Stage::Parse);
    let parsed = table::parse_table(&markdown, config.row_policy);
    stage_complete(cb, Stage::Parse, 0);

    // ── Step 5: Export ───────────────────────────────────────────────────
    let export_start = Instant::now();
    let (table, document, warning) = match parsed {
        Ok(t) => {
            stage_start(cb, Stage::Export);
            let bytes = export_blocking(&t, &config.title)
                .await
                .map_err(|e| stage_failed(cb, Stage::Export, e))?;
            let doc = ExportedDocument::new(config.output_file_name.clone(), bytes);
            stage_complete(cb, Stage::Export, export_start.elapsed().as_millis() as u64);
            (Some(t), Some(doc), None)
        }
        Err(e) => {
            warn!("Skipping export: {}", e);
            if let Some(cb) = cb {
                cb.on_stage_skipped(Stage::Export, &e.to_string());
            }
            (None, None, Some(e))
        }
    };
    let export_duration_ms = export_start.elapsed().as_millis() as u64;

    let stats = SummaryStats {
        prompt_tokens: response.prompt_tokens as u64,
        completion_tokens: response.completion_tokens as u64,
        extract_duration_ms,
        llm_duration_ms,
        export_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Summary complete: {} table rows, {}ms total",
        table.as_ref().map(|t| t.rows().len()).unwrap_or(0),
        stats.total_duration_ms
    );

    Ok(SummaryOutput {
        markdown,
        table,
        document,
        warning,
        source,
        stats,
    })
}

/// Summarise a file and write the `.docx` directly to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files. When the
/// answer holds no table nothing is written and the returned output carries
/// the warning.
pub async fn summarize_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    let output = summarize_file(input, config).await?;
    if let Some(ref doc) = output.document {
        write_atomic(output_path.as_ref(), &doc.bytes).await?;
    }
    Ok(output)
}

/// Synchronous wrapper around [`summarize_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn summarize_sync(
    path: impl AsRef<Path>,
    config: &SummaryConfig,
) -> Result<SummaryOutput, SummaryError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| SummaryError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(summarize_file(path, config))
}

/// Extract the text of a document without calling the model.
///
/// Does not require an API key.
pub async fn extract_only(path: impl AsRef<Path>) -> Result<String, SummaryError> {
    let doc = read_document(path.as_ref()).await?;
    extract::extract_text(doc).await
}

/// Write `bytes` to `path` via a sibling temp file and a rename.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SummaryError> {
    let write_failed = |source| SummaryError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
        }
    }

    let tmp_path = path.with_extension("docx.tmp");
    tokio::fs::write(&tmp_path, bytes).await.map_err(write_failed)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_failed(e));
    }
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn export_blocking(t: &table::Table, title: &str) -> Result<Vec<u8>, SummaryError> {
    let t = t.clone();
    let title = title.to_string();
    tokio::task::spawn_blocking(move || render_docx(&t, &title))
        .await
        .map_err(|e| SummaryError::Internal(format!("Export task panicked: {}", e)))?
}

fn stage_start(cb: Option<&ProgressCallback>, stage: Stage) {
    if let Some(cb) = cb {
        cb.on_stage_start(stage);
    }
}

fn stage_complete(cb: Option<&ProgressCallback>, stage: Stage, elapsed_ms: u64) {
    if let Some(cb) = cb {
        cb.on_stage_complete(stage, elapsed_ms);
    }
}

fn stage_failed(cb: Option<&ProgressCallback>, stage: Stage, err: SummaryError) -> SummaryError {
    if let Some(cb) = cb {
        cb.on_stage_error(stage, &err.to_string());
    }
    err
}
