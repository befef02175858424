//! Progress-callback trait for pipeline stage events.
//!
//! Inject an [`Arc<dyn PipelineProgressCallback>`] via
//! [`crate::config::SummaryConfigBuilder::progress_callback`] to hear about
//! each stage as the request moves through the pipeline. The CLI uses this
//! to drive a spinner; a server could forward the events to a websocket.
//!
//! # Example
//!
//! ```rust
//! use minutes_audit::{PipelineProgressCallback, Stage, SummaryConfig};
//! use std::sync::Arc;
//!
//! struct Log;
//!
//! impl PipelineProgressCallback for Log {
//!     fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
//!         eprintln!("{stage} done in {elapsed_ms}ms");
//!     }
//! }
//!
//! let config = SummaryConfig::builder()
//!     .progress_callback(Arc::new(Log) as Arc<dyn PipelineProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// One step of the summarisation pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    /// Reading the upload and pulling out its text.
    Extract,
    /// The model call.
    Summarize,
    /// Parsing the markdown table out of the answer.
    Parse,
    /// Building the `.docx`.
    Export,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Extract => "extract",
            Stage::Summarize => "summarize",
            Stage::Parse => "parse",
            Stage::Export => "export",
        };
        f.write_str(s)
    }
}

/// Called by the pipeline as it enters and leaves each stage.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait PipelineProgressCallback: Send + Sync {
    /// Called just before a stage starts.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage finishes successfully.
    fn on_stage_complete(&self, stage: Stage, elapsed_ms: u64) {
        let _ = (stage, elapsed_ms);
    }

    /// Called when a stage fails; the pipeline stops after this.
    fn on_stage_error(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }

    /// Called when a stage is skipped (export without a table).
    fn on_stage_skipped(&self, stage: Stage, reason: &str) {
        let _ = (stage, reason);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl PipelineProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SummaryConfig`].
pub type ProgressCallback = Arc<dyn PipelineProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl PipelineProgressCallback for Recorder {
        fn on_stage_start(&self, stage: Stage) {
            self.events.lock().unwrap().push(format!("start:{stage}"));
        }

        fn on_stage_complete(&self, stage: Stage, _elapsed_ms: u64) {
            self.events.lock().unwrap().push(format!("done:{stage}"));
        }

        fn on_stage_skipped(&self, stage: Stage, _reason: &str) {
            self.events.lock().unwrap().push(format!("skip:{stage}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_stage_start(Stage::Extract);
        cb.on_stage_complete(Stage::Extract, 12);
        cb.on_stage_error(Stage::Summarize, "timeout");
        cb.on_stage_skipped(Stage::Export, "no table");
    }

    #[test]
    fn recorder_sees_events_in_order() {
        let rec = Recorder::default();
        rec.on_stage_start(Stage::Parse);
        rec.on_stage_complete(Stage::Parse, 1);
        rec.on_stage_error(Stage::Export, "ignored by default impl");
        rec.on_stage_skipped(Stage::Export, "no table");
        assert_eq!(
            *rec.events.lock().unwrap(),
            vec!["start:parse", "done:parse", "skip:export"]
        );
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Summarize.to_string(), "summarize");
    }
}
