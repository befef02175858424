//! CLI binary for minutes-audit.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `SummaryConfig`, prints the summary, and writes the `.docx`.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use minutes_audit::summarize::write_atomic;
use minutes_audit::{
    extract_only, summarize_file, PipelineProgressCallback, ProgressCallback, RowPolicy, Secrets,
    Stage, SummaryConfig, SummaryError,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress: one spinner whose message follows the current stage,
/// plus a log line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Extract => "Extracting text",
        Stage::Summarize => "Waiting for the model",
        Stage::Parse => "Parsing table",
        Stage::Export => "Building document",
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        self.bar.set_prefix(stage.to_string());
        self.bar.set_message(format!("{}…", stage_label(stage)));
    }

    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        self.bar.println(format!(
            "  {} {:<10} {}",
            green("✓"),
            stage.to_string(),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
    }

    fn on_stage_error(&self, stage: Stage, error: &str) {
        let msg = if error.chars().count() > 80 {
            let cut: String = error.chars().take(79).collect();
            format!("{cut}\u{2026}")
        } else {
            error.to_string()
        };
        self.bar
            .println(format!("  {} {:<10} {}", red("✗"), stage.to_string(), red(&msg)));
    }

    fn on_stage_skipped(&self, stage: Stage, reason: &str) {
        self.bar.println(format!(
            "  {} {:<10} {}",
            yellow("–"),
            stage.to_string(),
            dim(&format!("skipped: {reason}")),
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Summarise a PDF; table printed, audit_summary.docx written
  minutes2docx minutes-2024-03.pdf

  # Choose the output path and heading
  minutes2docx minutes.docx -o q1/audit.docx --title "Q1 Board Minutes"

  # Key from a secrets file
  minutes2docx minutes.pdf --secrets secrets.toml

  # Reject rows whose cell count differs from the header
  minutes2docx --strict-rows minutes.pdf

  # Just show the extracted text (no API key needed)
  minutes2docx --extract-only minutes.pdf

  # JSON output (summary, parsed table, stats)
  minutes2docx --json --no-docx minutes.pdf > summary.json

SECRETS FILE (TOML):
  [openai]
  api_key = "sk-..."

ENVIRONMENT VARIABLES:
  MINUTES_API_KEY         OpenAI API key (same as --api-key)
  OPENAI_API_KEY          Used via provider auto-detection when no key is given
  ANTHROPIC_API_KEY       Anthropic API key (auto-detection)
  GEMINI_API_KEY          Google Gemini API key (auto-detection)
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  RUST_LOG                Log filter, e.g. minutes_audit=debug
"#;

/// Summarise board meeting minutes into an audit table.
#[derive(Parser, Debug)]
#[command(
    name = "minutes2docx",
    version,
    about = "Summarise board meeting minutes (DOCX/PDF) into an audit table and export it as .docx",
    long_about = "Extract the text of a board minutes document (.docx or .pdf), ask a language \
model for an audit-oriented summary table, print it, and write the table to a Word document.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Minutes document (.docx or .pdf).
    input: PathBuf,

    /// Where to write the exported document.
    #[arg(short, long, env = "MINUTES_OUTPUT", default_value = "audit_summary.docx")]
    output: PathBuf,

    /// OpenAI API key.
    #[arg(long, env = "MINUTES_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// TOML secrets file with an `[openai] api_key` entry.
    #[arg(long, env = "MINUTES_SECRETS")]
    secrets: Option<PathBuf>,

    /// Model ID.
    #[arg(long, env = "MINUTES_MODEL", default_value = "gpt-3.5-turbo")]
    model: String,

    /// LLM provider used when no API key is given: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "MINUTES_PROVIDER")]
    provider: Option<String>,

    /// Base URL of an OpenAI-compatible endpoint.
    #[arg(long, env = "MINUTES_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "MINUTES_TEMPERATURE", default_value_t = 0.3)]
    temperature: f32,

    /// Max tokens the model may generate.
    #[arg(long, env = "MINUTES_MAX_TOKENS")]
    max_tokens: Option<usize>,

    /// Model call timeout in seconds.
    #[arg(long, env = "MINUTES_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Heading written above the table.
    #[arg(long, env = "MINUTES_TITLE")]
    title: Option<String>,

    /// Reject rows whose cell count differs from the header instead of padding/truncating.
    #[arg(long, env = "MINUTES_STRICT_ROWS")]
    strict_rows: bool,

    /// File containing a custom prompt with exactly one `{minutes}` placeholder.
    #[arg(long, env = "MINUTES_PROMPT_TEMPLATE")]
    prompt_template: Option<PathBuf>,

    /// Print the extracted text and exit; no model call.
    #[arg(long)]
    extract_only: bool,

    /// Output structured JSON (SummaryOutput) instead of markdown.
    #[arg(long, env = "MINUTES_JSON")]
    json: bool,

    /// Do not write the .docx.
    #[arg(long, env = "MINUTES_NO_DOCX")]
    no_docx: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MINUTES_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the summary itself.
    #[arg(short, long, env = "MINUTES_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers INFO-level progress, so library logs drop to WARN
    // while it is on.
    let show_progress = !cli.quiet && !cli.json && !cli.extract_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else if show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Pipeline failures get the short user-facing message; the full
            // chain is available with -v.
            match err.downcast_ref::<SummaryError>() {
                Some(e) => {
                    eprintln!("{} {}", red("✘"), e.user_message());
                    tracing::debug!("{:#}", err);
                }
                None => eprintln!("{} {:#}", red("✘"), err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    // ── Extract-only mode ────────────────────────────────────────────────
    if cli.extract_only {
        let text = extract_only(&cli.input).await?;
        if cli.json {
            let json = serde_json::json!({
                "file_name": cli.input.display().to_string(),
                "chars": text.chars().count(),
                "text": text,
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&json).context("Failed to serialise output")?
            );
        } else {
            write_stdout(&text)?;
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress = show_progress.then(CliProgressCallback::new);
    let config = build_config(cli, progress.clone().map(|p| p as ProgressCallback)).await?;

    // ── Run summary ──────────────────────────────────────────────────────
    let result = summarize_file(&cli.input, &config).await;
    if let Some(ref p) = progress {
        p.finish();
    }
    let output = result?;

    let mut written = None;
    if let Some(ref doc) = output.document {
        if !cli.no_docx {
            write_atomic(&cli.output, &doc.bytes).await?;
            written = Some(&cli.output);
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        write_stdout(&output.markdown)?;
    }

    if let Some(msg) = output.warning_message() {
        eprintln!("{} {}", yellow("⚠"), msg);
    }

    if !cli.quiet && !cli.json {
        if let Some(path) = written {
            eprintln!(
                "{}  {} rows  {}ms  →  {}",
                green("✔"),
                output.table.as_ref().map(|t| t.rows().len()).unwrap_or(0),
                output.stats.total_duration_ms,
                bold(&path.display().to_string()),
            );
        }
        eprintln!(
            "   {} tokens in  /  {} tokens out",
            dim(&output.stats.prompt_tokens.to_string()),
            dim(&output.stats.completion_tokens.to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `SummaryConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<SummaryConfig> {
    let mut builder = SummaryConfig::builder()
        .model(cli.model.clone())
        .temperature(cli.temperature)
        .api_timeout_secs(cli.api_timeout);

    // Explicit flag wins over the secrets file.
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref path) = cli.secrets {
        let secrets = Secrets::load(path)?;
        builder = builder.secrets(&secrets);
    }

    if let Some(ref provider) = cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(ref url) = cli.api_base_url {
        builder = builder.api_base_url(url.clone());
    }
    if let Some(n) = cli.max_tokens {
        builder = builder.max_tokens(n);
    }
    if let Some(ref title) = cli.title {
        builder = builder.title(title.clone());
    }
    if let Some(ref path) = cli.prompt_template {
        let template = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt template from {:?}", path))?;
        builder = builder.prompt_template(template);
    }
    if cli.strict_rows {
        builder = builder.row_policy(RowPolicy::Strict);
    }
    if let Some(name) = cli.output.file_name().and_then(|n| n.to_str()) {
        builder = builder.output_file_name(name);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    Ok(builder.build()?)
}

fn write_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}
