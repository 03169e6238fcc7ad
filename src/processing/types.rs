//! Core data types and error definitions for the summarization pipeline.

use crate::extraction::ExtractionError;
use crate::summarization::{SummaryErrorKind, SummaryType};
use serde::Serialize;
use thiserror::Error;

/// Name given to the input item built from the direct-text form field.
pub const DIRECT_TEXT_NAME: &str = "Direct Text Input";

/// Errors emitted by the summarization pipeline.
///
/// Summarization failures never appear here; they are folded into each [`SummaryResult`].
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// An accepted upload could not be turned into text.
    #[error("Failed to extract text from {file}: {source}")]
    Extraction {
        /// Sanitized name of the offending upload.
        file: String,
        /// Underlying extraction failure.
        #[source]
        source: ExtractionError,
    },
    /// An accepted upload could not be written to the upload directory.
    #[error("Failed to store upload {file}: {source}")]
    Upload {
        /// Sanitized name of the offending upload.
        file: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The blocking extraction task panicked or was cancelled.
    #[error("Extraction task failed: {0}")]
    Task(String),
}

impl ProcessingError {
    /// Name of the upload the error refers to, if any.
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::Extraction { file, .. } | Self::Upload { file, .. } => Some(file),
            Self::Task(_) => None,
        }
    }
}

/// A file part received from the multipart form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename, unsanitized.
    pub filename: String,
    /// Raw file bytes.
    pub data: Vec<u8>,
}

/// Everything one summarize request asks for.
#[derive(Debug, Clone, Default)]
pub struct SummaryBatch {
    /// Uploaded files in arrival order.
    pub files: Vec<UploadedFile>,
    /// Optional pasted text, summarized after all files.
    pub text: Option<String>,
    /// Requested granularity applied to every item.
    pub summary_type: SummaryType,
}

/// One unit of text to be summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputItem {
    name: String,
    text: String,
}

impl InputItem {
    /// Build an item from a display name and its source text.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Item built from the direct-text form field.
    pub fn direct_text(text: impl Into<String>) -> Self {
        Self::new(DIRECT_TEXT_NAME, text)
    }

    /// Display name reported alongside the summary.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source text.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Summary of a single input item as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryResult {
    /// Name of the input item.
    pub name: String,
    /// Summary text, or a fixed user-facing message when summarization failed.
    pub summary: String,
    /// Percentage length reduction from source to summary, in `[0, 100]`.
    pub reduction: f64,
    /// Failure classification; absent when the summary succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SummaryErrorKind>,
}

/// Result of a full batch, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    /// One entry per accepted file, then one for direct text when present.
    pub summaries: Vec<SummaryResult>,
    /// Original filenames rejected by the extension allow-list.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

/// Percentage reduction in character length, rounded to two decimals and clamped to `[0, 100]`.
///
/// An empty original yields `0`.
pub fn reduction_percentage(original: &str, summary: &str) -> f64 {
    let original_len = original.chars().count();
    if original_len == 0 {
        return 0.0;
    }
    let summary_len = summary.chars().count();
    let reduction = 100.0 - (summary_len as f64 / original_len as f64) * 100.0;
    ((reduction * 100.0).round_ties_even() / 100.0).clamp(0.0, 100.0)
}
