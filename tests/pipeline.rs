//! Offline integration tests: the whole pipeline against a canned
//! LLM provider, so no network or API key is needed.

use async_trait::async_trait;
use docx_rs::{Docx, Paragraph, Run};
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, LLMResponse, MockProvider};
use minutes_audit::{
    read_docx_table, read_docx_title, summarize_bytes, summarize_file, summarize_to_file,
    PipelineProgressCallback, RowPolicy, Stage, SummaryConfig, SummaryError, TableError,
};
use std::io::Cursor;
use std::sync::{Arc, Mutex};

// ── Test helpers ─────────────────────────────────────────────────────────────

const MINUTES: &[&str] = &[
    "Board of Directors - Regular Meeting",
    "Date: 2024-03-14",
    "The board approved the FY24 capital budget of $2.4M.",
    "The CFO will present revised covenant calculations by 2024-04-30.",
];

const ANSWER: &str = "\
Here is the summary.

| Date of Meeting | Attendees | Key Points | Audit Impact |
|-----------------|-----------|------------|--------------|
| 2024-03-14 | Board | - FY24 capital budget of $2.4M approved | Opportunity for process improvement |
| 2024-03-14 | CFO | - Revised covenant calculations due 2024-04-30 | Risk of non-compliance |
";

/// Answers every chat with a fixed string and records what it was sent.
struct StubProvider {
    answer: String,
    calls: Mutex<Vec<(Vec<ChatMessage>, Option<CompletionOptions>)>>,
}

impl StubProvider {
    fn new(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn last_call(&self) -> (Vec<ChatMessage>, Option<CompletionOptions>) {
        self.calls.lock().unwrap().last().cloned().expect("no call")
    }
}

#[async_trait]
impl LLMProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn model(&self) -> &str {
        "stub-model"
    }

    fn max_context_length(&self) -> usize {
        16_384
    }

    async fn complete(&self, prompt: &str) -> edgequake_llm::Result<LLMResponse> {
        self.chat(&[ChatMessage::user(prompt)], None).await
    }

    async fn complete_with_options(
        &self,
        prompt: &str,
        options: &CompletionOptions,
    ) -> edgequake_llm::Result<LLMResponse> {
        self.chat(&[ChatMessage::user(prompt)], Some(options)).await
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        options: Option<&CompletionOptions>,
    ) -> edgequake_llm::Result<LLMResponse> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), options.cloned()));
        Ok(LLMResponse::new(self.answer.clone(), "stub-model").with_usage(120, 80))
    }
}

#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl PipelineProgressCallback for Recorder {
    fn on_stage_start(&self, stage: Stage) {
        self.0.lock().unwrap().push(format!("start {stage}"));
    }
    fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
        self.0.lock().unwrap().push(format!("done {stage}"));
    }
    fn on_stage_error(&self, stage: Stage, _error: &str) {
        self.0.lock().unwrap().push(format!("error {stage}"));
    }
    fn on_stage_skipped(&self, stage: Stage, _reason: &str) {
        self.0.lock().unwrap().push(format!("skip {stage}"));
    }
}

fn minutes_docx() -> Vec<u8> {
    let mut docx = Docx::new();
    for p in MINUTES {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*p)));
    }
    let mut buf = Cursor::new(Vec::new());
    docx.build().pack(&mut buf).expect("pack docx");
    buf.into_inner()
}

fn config_with(provider: Arc<dyn LLMProvider>) -> SummaryConfig {
    SummaryConfig::builder()
        .provider(provider)
        .build()
        .expect("valid config")
}

// ── Happy path ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn docx_minutes_become_a_docx_table() {
    let provider = StubProvider::new(ANSWER);
    let config = config_with(provider.clone());

    let output = summarize_bytes("Minutes-March.DOCX", minutes_docx(), &config)
        .await
        .unwrap();

    // One user message that embeds every extracted paragraph, once.
    let (messages, options) = provider.last_call();
    assert_eq!(messages.len(), 1);
    for p in MINUTES {
        assert_eq!(messages[0].content.matches(p).count(), 1, "missing {p:?}");
    }
    assert_eq!(options.unwrap().temperature, Some(0.3));

    // The summary is shown verbatim (after cleanup).
    assert!(output.markdown.starts_with("Here is the summary."));
    assert!(output.warning.is_none());

    let table = output.table.as_ref().unwrap();
    assert_eq!(table.width(), 4);
    assert_eq!(table.rows().len(), 2);

    let doc = output.document.as_ref().unwrap();
    assert_eq!(doc.file_name, "audit_summary.docx");
    assert_eq!(doc.size_bytes, doc.bytes.len());

    let round_trip = read_docx_table(&doc.bytes).unwrap().unwrap();
    assert_eq!(&round_trip, table);
    assert_eq!(round_trip.header()[0], "Date of Meeting");
    assert_eq!(round_trip.rows()[1][1], "CFO");
    assert_eq!(round_trip.rows()[1][3], "Risk of non-compliance");
    assert_eq!(
        read_docx_title(&doc.bytes).unwrap().as_deref(),
        Some("Board Minutes Summary for Audit")
    );

    assert_eq!(output.stats.prompt_tokens, 120);
    assert_eq!(output.stats.completion_tokens, 80);
    assert!(output.source.extracted_chars > 0);
}

#[tokio::test]
async fn stages_are_reported_in_order() {
    let recorder = Arc::new(Recorder::default());
    let config = SummaryConfig::builder()
        .provider(StubProvider::new(ANSWER) as Arc<dyn LLMProvider>)
        .progress_callback(recorder.clone() as Arc<dyn PipelineProgressCallback>)
        .build()
        .unwrap();

    summarize_bytes("m.docx", minutes_docx(), &config).await.unwrap();

    let events = recorder.0.lock().unwrap().clone();
    assert_eq!(
        events,
        [
            "start extract",
            "done extract",
            "start summarize",
            "done summarize",
            "start parse",
            "done parse",
            "start export",
            "done export",
        ]
    );
}

#[tokio::test]
async fn fenced_answer_is_unwrapped_before_parsing() {
    let fenced = format!("```markdown\n{}\n```", "| A | B |\n|---|---|\n| 1 | 2 |");
    let config = config_with(StubProvider::new(&fenced));

    let output = summarize_bytes("m.docx", minutes_docx(), &config).await.unwrap();

    assert!(!output.markdown.contains("```"));
    assert_eq!(output.table.unwrap().rows(), [vec!["1".to_string(), "2".to_string()]]);
}

#[tokio::test]
async fn custom_title_and_file_name_are_used() {
    let config = SummaryConfig::builder()
        .provider(StubProvider::new(ANSWER) as Arc<dyn LLMProvider>)
        .title("Q1 Board Minutes")
        .output_file_name("q1.docx")
        .build()
        .unwrap();

    let output = summarize_bytes("m.docx", minutes_docx(), &config).await.unwrap();
    let doc = output.document.unwrap();

    assert_eq!(doc.file_name, "q1.docx");
    assert_eq!(
        read_docx_title(&doc.bytes).unwrap().as_deref(),
        Some("Q1 Board Minutes")
    );
}

// ── No table / ragged rows ───────────────────────────────────────────────────

#[tokio::test]
async fn answer_without_table_keeps_text_and_warns() {
    let recorder = Arc::new(Recorder::default());
    let config = SummaryConfig::builder()
        .provider(StubProvider::new("The minutes contain no audit-relevant items.") as Arc<dyn LLMProvider>)
        .progress_callback(recorder.clone() as Arc<dyn PipelineProgressCallback>)
        .build()
        .unwrap();

    let output = summarize_bytes("m.docx", minutes_docx(), &config).await.unwrap();

    assert_eq!(output.markdown, "The minutes contain no audit-relevant items.");
    assert!(output.table.is_none());
    assert!(output.document.is_none());
    assert_eq!(output.warning, Some(TableError::NoTable));
    assert_eq!(
        output.warning_message().as_deref(),
        Some("Could not generate downloadable summary.")
    );
    assert_eq!(recorder.0.lock().unwrap().last().unwrap(), "skip export");
}

const RAGGED: &str = "\
| Date | Impact |
|---|---|
| 2024-01-01 | Reporting | extra |
| 2024-02-01 |
";

#[tokio::test]
async fn ragged_rows_are_normalised_by_default() {
    let config = config_with(StubProvider::new(RAGGED));

    let output = summarize_bytes("m.docx", minutes_docx(), &config).await.unwrap();
    let table = output.table.unwrap();

    assert_eq!(table.rows()[0], ["2024-01-01", "Reporting"]);
    assert_eq!(table.rows()[1], ["2024-02-01", ""]);
    assert!(output.document.is_some());
}

#[tokio::test]
async fn ragged_rows_are_rejected_when_strict() {
    let config = SummaryConfig::builder()
        .provider(StubProvider::new(RAGGED) as Arc<dyn LLMProvider>)
        .row_policy(RowPolicy::Strict)
        .build()
        .unwrap();

    let output = summarize_bytes("m.docx", minutes_docx(), &config).await.unwrap();

    assert!(output.document.is_none());
    assert_eq!(
        output.warning,
        Some(TableError::RaggedRow {
            row: 1,
            expected: 2,
            found: 3
        })
    );
    // The summary itself is still shown.
    assert!(output.markdown.contains("2024-01-01"));
}

// ── Fatal errors ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn unsupported_extension_is_rejected_before_the_model() {
    let provider = StubProvider::new(ANSWER);
    let config = config_with(provider.clone());

    let err = summarize_bytes("minutes.txt", b"plain".to_vec(), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, SummaryError::UnsupportedFileType { .. }));
    assert_eq!(err.user_message(), "Unsupported file type.");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn corrupt_docx_is_an_extraction_error() {
    let provider = StubProvider::new(ANSWER);
    let config = config_with(provider.clone());

    let err = summarize_bytes("minutes.docx", b"not a zip".to_vec(), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, SummaryError::ExtractionFailed { .. }));
    assert!(err.user_message().starts_with("Something went wrong: "));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn blank_answer_is_fatal() {
    let provider = MockProvider::new();
    provider.add_response("   \n").await;
    let config = config_with(Arc::new(provider));
    let err = summarize_bytes("m.docx", minutes_docx(), &config)
        .await
        .unwrap_err();
    assert!(matches!(err, SummaryError::EmptyResponse));
}

// ── File entry points ────────────────────────────────────────────────────────

#[tokio::test]
async fn summarize_to_file_writes_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("minutes.docx");
    std::fs::write(&input, minutes_docx()).unwrap();
    let out = dir.path().join("out/audit_summary.docx");

    let config = config_with(StubProvider::new(ANSWER));
    let output = summarize_to_file(&input, &out, &config).await.unwrap();

    let bytes = std::fs::read(&out).unwrap();
    assert_eq!(bytes, output.document.unwrap().bytes);
    assert_eq!(read_docx_table(&bytes).unwrap().unwrap().rows().len(), 2);
}

#[tokio::test]
async fn summarize_to_file_writes_nothing_without_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("minutes.docx");
    std::fs::write(&input, minutes_docx()).unwrap();
    let out = dir.path().join("audit_summary.docx");

    let config = config_with(StubProvider::new("No table today."));
    let output = summarize_to_file(&input, &out, &config).await.unwrap();

    assert!(output.warning.is_some());
    assert!(!out.exists());
}

#[test]
fn summarize_file_from_blocking_context() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("MINUTES.DocX");
    std::fs::write(&input, minutes_docx()).unwrap();
    let config = config_with(StubProvider::new(ANSWER));

    let output = tokio_test::block_on(summarize_file(&input, &config)).unwrap();
    assert_eq!(output.source.file_name, "MINUTES.DocX");
    assert!(output.document.is_some());
}
