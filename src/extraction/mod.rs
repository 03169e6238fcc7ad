//! Plain-text extraction for the supported upload formats.
//!
//! Format is resolved from the file extension only; the allow-list is exactly `pdf`, `txt`, and
//! `docx` (case-insensitive). Extraction is blocking and should run off the async executor.

mod docx;
mod pdf;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while turning a stored upload into plain text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// File extension is not on the allow-list.
    #[error("unsupported file type: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    /// The file could not be read from disk.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed to open or read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Plain-text upload was not valid UTF-8.
    #[error("{} is not valid UTF-8", .0.display())]
    InvalidUtf8(PathBuf),
    /// PDF document could not be parsed.
    #[error("failed to parse PDF {}: {message}", .path.display())]
    Pdf {
        /// Offending file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
    /// DOCX container or its main document part could not be parsed.
    #[error("failed to parse DOCX {}: {message}", .path.display())]
    Docx {
        /// Offending file.
        path: PathBuf,
        /// Parser diagnostic.
        message: String,
    },
}

/// Upload formats accepted by the allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Portable Document Format.
    Pdf,
    /// UTF-8 plain text.
    PlainText,
    /// Office Open XML word-processor document.
    Docx,
}

/// Extensions accepted for upload, lowercase.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "txt", "docx"];

impl DocumentFormat {
    /// Resolve a format from a bare extension, ignoring case.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "txt" => Some(Self::PlainText),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    /// Resolve a format from the text after the last `.` in a filename.
    ///
    /// Names without a `.` never match, so `pdf` alone is rejected while `report.PDF` is accepted.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, extension) = filename.rsplit_once('.')?;
        Self::from_extension(extension)
    }

    /// Resolve a format from a filesystem path.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|extension| extension.to_str())
            .and_then(Self::from_extension)
    }

    /// Canonical lowercase extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::PlainText => "txt",
            Self::Docx => "docx",
        }
    }
}

/// Extract trimmed plain text from a stored file, dispatching on its extension.
pub fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    let format = DocumentFormat::from_path(path)
        .ok_or_else(|| ExtractionError::UnsupportedFormat(path.to_path_buf()))?;

    let text = match format {
        DocumentFormat::Pdf => pdf::extract(path)?,
        DocumentFormat::PlainText => read_plain_text(path)?,
        DocumentFormat::Docx => docx::extract(path)?,
    };

    tracing::debug!(
        path = %path.display(),
        format = ?format,
        chars = text.chars().count(),
        "Extracted document text"
    );

    Ok(text.trim().to_string())
}

fn read_plain_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    String::from_utf8(bytes).map_err(|_| ExtractionError::InvalidUtf8(path.to_path_buf()))
}
