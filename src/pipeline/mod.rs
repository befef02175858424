//! Pipeline stages for minutes summarisation.
//!
//! Each submodule implements exactly one transformation step, so every stage
//! is testable on its own and the orchestrator in [`crate::summarize`] is
//! nothing but sequencing.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ llm ──▶ postprocess ──▶ table ──▶ export
//! (upload)  (docx/pdf)  (model)  (cleanup)      (parse)   (.docx)
//! ```
//!
//! 1. [`input`]   — wrap the upload, decide DOCX vs PDF from the extension
//! 2. [`extract`] — pull plain text out; runs in `spawn_blocking`
//! 3. [`llm`]     — one bounded completion call; the only network I/O
//! 4. [`postprocess`] — strip fences and invisible characters
//! 5. [`table`]   — markdown table → rectangular [`table::Table`]
//! 6. [`export`]  — [`table::Table`] → `.docx` bytes

pub mod export;
pub mod extract;
pub mod input;
pub mod llm;
pub mod postprocess;
pub mod table;
