#![deny(missing_docs)]

//! Core library for the Synopsis document summarization server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Plain-text extraction for PDF, TXT, and DOCX uploads.
pub mod extraction;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization metrics helpers.
pub mod metrics;
/// Request orchestration: uploads, extraction, and per-item summaries.
pub mod processing;
/// Gemini summarization client and prompt construction.
pub mod summarization;
