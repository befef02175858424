//! Input acquisition: turn a path or an in-memory upload into a [`RawDocument`].
//!
//! The document kind is decided by the file extension alone. There is no
//! magic-byte sniffing: a `.pdf` that is really a DOCX will fail later, in
//! extraction, with an [`SummaryError::ExtractionFailed`] error.

use crate::error::SummaryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// The two document formats the pipeline can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    /// Office Open XML word-processing document.
    Docx,
    /// Portable Document Format.
    Pdf,
}

impl DocumentKind {
    /// Detect the kind from a file name's extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase());

        match ext.as_deref() {
            Some("docx") => Some(DocumentKind::Docx),
            Some("pdf") => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Docx => f.write_str("DOCX"),
            DocumentKind::Pdf => f.write_str("PDF"),
        }
    }
}

/// An uploaded document, owned until text extraction consumes it.
#[derive(Clone)]
pub struct RawDocument {
    file_name: String,
    kind: DocumentKind,
    bytes: Vec<u8>,
}

impl RawDocument {
    /// Wrap in-memory bytes, rejecting unsupported extensions immediately.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, SummaryError> {
        let file_name = file_name.into();
        let kind = DocumentKind::from_file_name(&file_name)
            .ok_or_else(|| SummaryError::UnsupportedFileType {
                file_name: file_name.clone(),
            })?;
        Ok(Self {
            file_name,
            kind,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDocument")
            .field("file_name", &self.file_name)
            .field("kind", &self.kind)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Read a local file into a [`RawDocument`].
///
/// The extension is checked before the file is opened so an unsupported
/// upload never touches the disk.
pub async fn read_document(path: &Path) -> Result<RawDocument, SummaryError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if DocumentKind::from_file_name(&file_name).is_none() {
        return Err(SummaryError::UnsupportedFileType { file_name });
    }

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => SummaryError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => SummaryError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    debug!("Read {} ({} bytes)", path.display(), bytes.len());
    RawDocument::from_bytes(file_name, bytes)
}
