//! Request orchestration: upload storage, text extraction, and per-item summarization.

pub mod sanitize;
mod service;
pub mod types;

pub use service::{SummaryApi, SummaryService};
pub use types::{
    BatchOutcome, DIRECT_TEXT_NAME, InputItem, ProcessingError, SummaryBatch, SummaryResult,
    UploadedFile, reduction_percentage,
};
