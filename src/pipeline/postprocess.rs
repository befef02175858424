//! Post-processing: deterministic cleanup of the model's answer.
//!
//! The same text is shown to the user and fed to the table parser, so the
//! rules here only remove wrapping and noise; cell content is never touched.
//!
//! Rules (applied in order):
//! 1. Normalise line endings (CRLF/CR → LF)
//! 2. Trim trailing whitespace per line
//! 3. Strip an outer ```` ```markdown ```` fence the model was told not to add
//! 4. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
//! 5. Trim leading/trailing blank space of the whole answer

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to the raw model output.
pub fn clean_summary(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = trim_trailing_whitespace(&s);
    let s = strip_markdown_fences(&s);
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:markdown|md)?\n(.*)\n```$").unwrap());

fn strip_markdown_fences(input: &str) -> String {
    match RE_OUTER_FENCES.captures(input.trim()) {
        Some(caps) => caps[1].to_string(),
        None => input.to_string(),
    }
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}
