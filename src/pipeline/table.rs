//! Markdown table parsing: model response text → validated [`Table`].
//!
//! The model is asked for "a well-formatted Markdown table only", but the
//! response is free text and is treated as such. Recognition is deliberately
//! simple:
//!
//! 1. a line belongs to the table iff it contains a `|`;
//! 2. a table line containing `---` is the header separator and is dropped;
//! 3. each remaining line is split on `|`, the first and last segments are
//!    discarded (they hold whatever sits outside the outer pipes), and every
//!    other segment is trimmed into a cell;
//! 4. the first surviving row is the header.
//!
//! A `\|` inside a cell is read as a literal pipe rather than a delimiter.
//!
//! Rows whose width differs from the header are resolved by [`RowPolicy`],
//! so a [`Table`] is always rectangular by the time it reaches the exporter.

use crate::error::TableError;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Placeholder used while splitting so escaped pipes survive `split('|')`.
const ESCAPED_PIPE: char = '\u{E000}';

/// What to do with a data row whose cell count differs from the header's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RowPolicy {
    /// Pad short rows with empty cells and truncate long rows. (default)
    #[default]
    Normalize,
    /// Reject the whole table with [`TableError::RaggedRow`].
    Strict,
}

/// A rectangular table: one header row plus zero or more data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table, applying `policy` to rows that do not match the header.
    ///
    /// An empty header is reported as [`TableError::NoTable`].
    pub fn new(
        header: Vec<String>,
        rows: Vec<Vec<String>>,
        policy: RowPolicy,
    ) -> Result<Self, TableError> {
        if header.is_empty() {
            return Err(TableError::NoTable);
        }
        let width = header.len();

        let mut normalized = Vec::with_capacity(rows.len());
        for (i, mut row) in rows.into_iter().enumerate() {
            if row.len() != width {
                match policy {
                    RowPolicy::Strict => {
                        return Err(TableError::RaggedRow {
                            row: i + 1,
                            expected: width,
                            found: row.len(),
                        });
                    }
                    RowPolicy::Normalize => {
                        warn!(
                            "Table row {} has {} cells, header has {}; normalising",
                            i + 1,
                            row.len(),
                            width
                        );
                        row.resize(width, String::new());
                    }
                }
            }
            normalized.push(row);
        }

        Ok(Self {
            header,
            rows: normalized,
        })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of columns (the header's width).
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Re-emit the table as GitHub-flavoured Markdown.
    ///
    /// Pipes inside cells are escaped so [`parse_table`] reads the output
    /// back to an identical table.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        push_markdown_row(&mut out, &self.header);
        out.push('|');
        for _ in 0..self.width() {
            out.push_str(" --- |");
        }
        out.push('\n');
        for row in &self.rows {
            push_markdown_row(&mut out, row);
        }
        out
    }
}

fn push_markdown_row(out: &mut String, cells: &[String]) {
    out.push('|');
    for cell in cells {
        out.push(' ');
        out.push_str(&cell.replace('|', "\\|"));
        out.push_str(" |");
    }
    out.push('\n');
}

/// Split response text into raw rows (header first).
///
/// Returns an empty vector when no table-like line survives.
pub fn extract_rows(text: &str) -> Vec<Vec<String>> {
    text.lines()
        .filter(|line| line.contains('|'))
        .filter(|line| !is_separator_line(line))
        .map(split_row)
        .filter(|cells| !cells.is_empty())
        .collect()
}

/// Parse a table out of `text`.
///
/// Every line containing `|` anywhere in the answer is collected into one
/// table, first such line as header; separator lines are dropped. Two
/// tables in one answer therefore merge, and the second header becomes a
/// data row.
pub fn parse_table(text: &str, policy: RowPolicy) -> Result<Table, TableError> {
    let mut rows = extract_rows(text);
    if rows.is_empty() {
        debug!("No table rows found in {} chars of text", text.len());
        return Err(TableError::NoTable);
    }
    let header = rows.remove(0);
    debug!("Parsed table: {} columns, {} data rows", header.len(), rows.len());
    Table::new(header, rows, policy)
}

/// A header separator is any table line with three or more consecutive dashes.
fn is_separator_line(line: &str) -> bool {
    line.contains("---")
}

fn split_row(line: &str) -> Vec<String> {
    let protected = line.replace("\\|", &ESCAPED_PIPE.to_string());
    let segments: Vec<&str> = protected.split('|').collect();
    if segments.len() < 3 {
        return Vec::new();
    }
    segments[1..segments.len() - 1]
        .iter()
        .map(|s| s.trim().replace(ESCAPED_PIPE, "|"))
        .collect()
}
