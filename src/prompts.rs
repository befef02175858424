//! Prompt template for the audit summary request.
//!
//! The template has exactly one substitution point, [`MINUTES_PLACEHOLDER`],
//! which receives the extracted minutes verbatim. Nothing is truncated or
//! chunked: a document that overflows the model's context window fails in
//! the model call and is reported like any other model error.
//!
//! Callers can override the default via
//! [`crate::config::SummaryConfig::prompt_template`]; the builder checks that
//! an override carries the placeholder exactly once.

/// Marker replaced by the extracted document text.
pub const MINUTES_PLACEHOLDER: &str = "{minutes}";

/// Default prompt: one row per key point, four audit columns, table only.
pub const AUDIT_SUMMARY_PROMPT: &str = r#"
You are a senior internal audit assistant.

Read the board meeting minutes below and generate a **high-quality summary table** for audit documentation.

For each key point discussed in the meeting, extract:

1. **Date of Meeting**
2. **Attendees** (if mentioned)
3. **Key Points** – Use concise but detailed bullet points. Mention any:
   - Decisions made
   - Issues raised
   - Actions assigned (to whom and when)
   - Financial, legal, or operational implications
4. **Audit Impact** – Clearly assess the relevance to audit, including:
   - "Control deficiency identified"
   - "Risk of non-compliance"
   - "Opportunity for process improvement"
   - "No audit implication"

⚠️ Use formal and professional tone. This summary will be used in an **internal audit file**.

Return your response as a **well-formatted Markdown table only**, without any extra explanation.

Board Minutes:
{minutes}
"#;

/// Substitute `minutes` into the default template.
pub fn build_prompt(minutes: &str) -> String {
    build_prompt_with(AUDIT_SUMMARY_PROMPT, minutes)
}

/// Substitute `minutes` into `template`.
///
/// Only the first placeholder is replaced, so placeholder-like text inside
/// the minutes themselves is left alone.
pub fn build_prompt_with(template: &str, minutes: &str) -> String {
    template.replacen(MINUTES_PLACEHOLDER, minutes, 1)
}

/// Number of placeholders in `template`; valid templates have exactly one.
pub fn placeholder_count(template: &str) -> usize {
    template.matches(MINUTES_PLACEHOLDER).count()
}
