//! HTTP surface for Synopsis.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /summarize` – Multipart form with zero or more `files` parts, an optional `text`
//!   field, and an optional `summary_type` (`1-line` | `3-line` | `5-line` | `paragraph`).
//!   Returns `{ "summaries": [{ "name", "summary", "reduction", "error"? }], "skipped"? }`,
//!   where `error` is present only on failed summaries and `skipped` only when the allow-list
//!   rejected at least one upload.
//! - `GET /metrics` – Observe summarization counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.

use crate::extraction::ALLOWED_EXTENSIONS;
use crate::processing::{
    BatchOutcome, ProcessingError, SummaryApi, SummaryBatch, SummaryResult, UploadedFile,
};
use crate::summarization::{RATE_LIMIT_MESSAGE, SummaryErrorKind, SummaryType};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>, max_upload_bytes: usize) -> Router
where
    S: SummaryApi + 'static,
{
    Router::new()
        .route("/summarize", post(summarize::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(service)
}

/// Summarize uploaded files and/or pasted text.
///
/// Items are summarized in arrival order: every accepted file first, then the pasted text.
async fn summarize<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<Json<BatchOutcome>, AppError>
where
    S: SummaryApi,
{
    let batch = parse_multipart(multipart).await?;
    let outcome = service.summarize_batch(batch).await?;
    tracing::info!(
        summaries = outcome.summaries.len(),
        skipped = outcome.skipped.len(),
        "Summarize request served"
    );
    Ok(Json(outcome))
}

/// Parse the summarize form into a batch, keeping file parts in arrival order.
async fn parse_multipart(mut multipart: Multipart) -> Result<SummaryBatch, AppError> {
    let mut batch = SummaryBatch::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read form field: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "files" => {
                let filename = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {e}")))?
                    .to_vec();
                batch.files.push(UploadedFile { filename, data });
            }
            "text" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read text: {e}")))?;
                if batch.text.is_none() && !value.is_empty() {
                    batch.text = Some(value);
                }
            }
            "summary_type" => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read summary_type: {e}"))
                })?;
                batch.summary_type = SummaryType::parse_lenient(&value);
            }
            _ => {
                // Ignore unknown fields
                let _ = field.bytes().await;
            }
        }
    }

    Ok(batch)
}

/// Return a metrics snapshot with summarization counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<crate::metrics::MetricsSnapshot>
where
    S: SummaryApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
    allowed_extensions: [&'static str; 3],
}

const SUMMARIZE_DESCRIPTION: &str = "Summarize uploaded documents (multipart `files`) and/or \
    pasted `text`. Each summary carries `name`, `summary`, `reduction` and, on failure, an \
    `error` kind; rejected uploads are listed in `skipped`.";

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: SUMMARIZE_DESCRIPTION,
                request_example: Some(json!({
                    "files": ["report.pdf", "notes.txt"],
                    "text": "Optional pasted text",
                    "summary_type": "3-line"
                })),
                response_example: serde_json::to_value(summarize_response_example()).ok(),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return summarization counters useful for observability dashboards.",
                request_example: None,
                response_example: None,
            },
        ],
        allowed_extensions: ALLOWED_EXTENSIONS,
    })
}

fn summarize_response_example() -> BatchOutcome {
    BatchOutcome {
        summaries: vec![
            SummaryResult {
                name: "report.pdf".into(),
                summary: "Revenue grew while costs held flat.".into(),
                reduction: 97.4,
                error: None,
            },
            SummaryResult {
                name: "notes.txt".into(),
                summary: RATE_LIMIT_MESSAGE.into(),
                reduction: 12.5,
                error: Some(SummaryErrorKind::RateLimited),
            },
        ],
        skipped: vec!["setup.exe".into()],
    }
}

/// Errors rendered as JSON responses.
enum AppError {
    BadRequest(String),
    Processing(ProcessingError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            Self::Processing(error) => {
                let status = match error {
                    ProcessingError::Extraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    ProcessingError::Upload { .. } | ProcessingError::Task(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                tracing::error!(%error, "Summarize request failed");
                let body = match error.file() {
                    Some(file) => json!({ "error": error.to_string(), "file": file }),
                    None => json!({ "error": error.to_string() }),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

impl From<ProcessingError> for AppError {
    fn from(inner: ProcessingError) -> Self {
        Self::Processing(inner)
    }
}
