//! Word export: [`Table`] → `.docx` bytes, and back again.
//!
//! The document holds a level-1 heading followed by a single bordered table
//! whose first row is the (bold) header. Everything is built in memory; the
//! caller decides whether the bytes go to disk, a socket, or a download.

use crate::error::SummaryError;
use crate::pipeline::extract::paragraph_text;
use crate::pipeline::table::{RowPolicy, Table};
use docx_rs::{
    Docx, Paragraph, Run, Style, StyleType, Table as DocxTable, TableCell, TableRow,
};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use tracing::debug;

/// Default heading written above the table.
pub const DEFAULT_TITLE: &str = "Board Minutes Summary for Audit";

/// Default download file name.
pub const DEFAULT_FILE_NAME: &str = "audit_summary.docx";

/// Style id of the level-1 heading paragraph.
const HEADING_STYLE: &str = "Heading1";

/// A serialised Word document ready for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedDocument {
    /// Suggested file name for the download.
    pub file_name: String,
    /// Size of `bytes`, kept for JSON output where the bytes are skipped.
    pub size_bytes: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl ExportedDocument {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            size_bytes: bytes.len(),
            bytes,
        }
    }
}

/// Render `table` under a level-1 `title` heading and pack it as `.docx`.
pub fn render_docx(table: &Table, title: &str) -> Result<Vec<u8>, SummaryError> {
    let heading_style = Style::new(HEADING_STYLE, StyleType::Paragraph)
        .name("Heading 1")
        .bold()
        .size(32);

    let mut rows = Vec::with_capacity(table.rows().len() + 1);
    rows.push(TableRow::new(
        table.header().iter().map(|h| text_cell(h, true)).collect(),
    ));
    for row in table.rows() {
        rows.push(TableRow::new(
            row.iter().map(|cell| text_cell(cell, false)).collect(),
        ));
    }

    let docx = Docx::new()
        .add_style(heading_style)
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(title))
                .style(HEADING_STYLE),
        )
        .add_table(DocxTable::new(rows));

    let mut buf = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buf)
        .map_err(|e| SummaryError::ExportFailed(e.to_string()))?;

    let bytes = buf.into_inner();
    debug!(
        "Packed .docx: {}x{} table, {} bytes",
        table.rows().len() + 1,
        table.width(),
        bytes.len()
    );
    Ok(bytes)
}

fn text_cell(text: &str, bold: bool) -> TableCell {
    let mut run = Run::new().add_text(text);
    if bold {
        run = run.bold();
    }
    TableCell::new().add_paragraph(Paragraph::new().add_run(run))
}

/// Read back the first table of a `.docx`, first row as header.
///
/// Returns `Ok(None)` when the document has no table. Multi-paragraph cells
/// are joined with `\n`.
pub fn read_docx_table(bytes: &[u8]) -> Result<Option<Table>, SummaryError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| SummaryError::ExportFailed(e.to_string()))?;

    let Some(table) = docx.document.children.iter().find_map(|child| match child {
        docx_rs::DocumentChild::Table(t) => Some(t),
        _ => None,
    }) else {
        return Ok(None);
    };

    let mut grid: Vec<Vec<String>> = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let docx_rs::TableChild::TableRow(tr) = row;
        let mut cells = Vec::with_capacity(tr.cells.len());
        for cell in &tr.cells {
            let docx_rs::TableRowChild::TableCell(tc) = cell;
            let text = tc
                .children
                .iter()
                .filter_map(|content| match content {
                    docx_rs::TableCellContent::Paragraph(p) => Some(paragraph_text(p)),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n");
            cells.push(text);
        }
        grid.push(cells);
    }

    if grid.is_empty() {
        return Ok(None);
    }
    let header = grid.remove(0);
    Table::new(header, grid, RowPolicy::Strict)
        .map(Some)
        .map_err(|e| SummaryError::ExportFailed(format!("table read back malformed: {e}")))
}

/// Read the text of the first paragraph (the heading) of a `.docx`.
pub fn read_docx_title(bytes: &[u8]) -> Result<Option<String>, SummaryError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| SummaryError::ExportFailed(e.to_string()))?;
    Ok(docx.document.children.iter().find_map(|child| match child {
        docx_rs::DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
        _ => None,
    }))
}
