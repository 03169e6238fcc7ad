//! Summary service coordinating upload storage, text extraction, and summarization.

use crate::{
    config::Config,
    extraction::{DocumentFormat, extract_text},
    metrics::{MetricsSnapshot, SummaryMetrics},
    processing::{
        sanitize::stored_filename,
        types::{
            BatchOutcome, InputItem, ProcessingError, SummaryBatch, SummaryResult, UploadedFile,
            reduction_percentage,
        },
    },
    summarization::{
        SummarizationClient, SummarizationClientError, SummaryType, get_summarization_client,
    },
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// Drives a batch through extraction and summarization, one item at a time.
///
/// The service owns the summarization client and metrics registry so the HTTP surface and the
/// CLI reuse the same components. Construct it once near process start and share it through an
/// `Arc`.
pub struct SummaryService {
    config: Arc<Config>,
    client: Box<dyn SummarizationClient>,
    metrics: Arc<SummaryMetrics>,
}

/// Abstraction over the summarization pipeline used by the HTTP surface.
#[async_trait]
pub trait SummaryApi: Send + Sync {
    /// Extract and summarize every accepted input of the batch, preserving arrival order.
    async fn summarize_batch(&self, batch: SummaryBatch) -> Result<BatchOutcome, ProcessingError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl SummaryService {
    /// Build a service backed by the Gemini client described in `config`.
    pub fn new(config: Arc<Config>) -> Result<Self, SummarizationClientError> {
        let client = get_summarization_client(&config)?;
        Ok(Self::with_client(config, client))
    }

    /// Build a service around an arbitrary summarization client.
    pub fn with_client(config: Arc<Config>, client: Box<dyn SummarizationClient>) -> Self {
        Self {
            config,
            client,
            metrics: Arc::new(SummaryMetrics::new()),
        }
    }

    /// Extract and summarize a batch.
    ///
    /// Files outside the allow-list are skipped and reported in [`BatchOutcome::skipped`]. Any
    /// extraction or storage failure aborts the whole batch.
    pub async fn summarize_batch(
        &self,
        batch: SummaryBatch,
    ) -> Result<BatchOutcome, ProcessingError> {
        let SummaryBatch {
            files,
            text,
            summary_type,
        } = batch;

        tracing::info!(
            files = files.len(),
            direct_text = text.is_some(),
            summary_type = summary_type.as_str(),
            "Processing summarize request"
        );

        let (mut items, skipped) = self.collect_uploads(files).await?;
        if let Some(text) = text.filter(|text| !text.is_empty()) {
            items.push(InputItem::direct_text(text));
        }

        let summaries = self.summarize_inputs(items, summary_type).await;
        tracing::info!(
            summaries = summaries.len(),
            skipped = skipped.len(),
            "Summarize request completed"
        );

        Ok(BatchOutcome { summaries, skipped })
    }

    /// Summarize already-extracted items sequentially, in order.
    pub async fn summarize_inputs(
        &self,
        items: Vec<InputItem>,
        summary_type: SummaryType,
    ) -> Vec<SummaryResult> {
        let mut summaries = Vec::with_capacity(items.len());
        for item in items {
            summaries.push(self.summarize_item(&item, summary_type).await);
        }
        summaries
    }

    /// Summarize one item, folding a client failure into its user-facing message.
    pub async fn summarize_item(
        &self,
        item: &InputItem,
        summary_type: SummaryType,
    ) -> SummaryResult {
        let (summary, error) = match self.client.summarize(item.text(), summary_type).await {
            Ok(summary) => (summary, None),
            Err(error) => {
                tracing::warn!(
                    name = item.name(),
                    kind = ?error.kind(),
                    %error,
                    "Summarization failed"
                );
                (error.user_message().to_string(), Some(error.kind()))
            }
        };

        let reduction = reduction_percentage(item.text(), &summary);
        self.metrics.record_summary(
            item.text().chars().count() as u64,
            summary.chars().count() as u64,
            error.is_some(),
        );
        tracing::debug!(name = item.name(), reduction, "Summarized input item");

        SummaryResult {
            name: item.name().to_string(),
            summary,
            reduction,
            error,
        }
    }

    /// Retrieve the current metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    async fn collect_uploads(
        &self,
        files: Vec<UploadedFile>,
    ) -> Result<(Vec<InputItem>, Vec<String>), ProcessingError> {
        let mut items = Vec::new();
        let mut skipped = Vec::new();
        let mut request_dir: Option<PathBuf> = None;

        for file in files {
            if file.filename.is_empty() {
                tracing::debug!("Ignoring file part without a filename");
                continue;
            }
            let Some(format) = DocumentFormat::from_filename(&file.filename) else {
                tracing::info!(
                    filename = %file.filename,
                    "Skipping upload with disallowed extension"
                );
                self.metrics.record_skipped_file();
                skipped.push(file.filename);
                continue;
            };

            let dir = request_dir.get_or_insert_with(|| {
                self.config.upload_dir.join(Uuid::new_v4().to_string())
            });
            items.push(store_and_extract(dir.as_path(), file, format).await?);
        }

        Ok((items, skipped))
    }
}

/// Persist an accepted upload under `dir` and extract its text off the async executor.
async fn store_and_extract(
    dir: &Path,
    file: UploadedFile,
    format: DocumentFormat,
) -> Result<InputItem, ProcessingError> {
    let name = stored_filename(&file.filename, format);
    let upload_error = |source: std::io::Error| ProcessingError::Upload {
        file: name.clone(),
        source,
    };

    tokio::fs::create_dir_all(dir).await.map_err(upload_error)?;
    let path = dir.join(&name);
    tokio::fs::write(&path, &file.data)
        .await
        .map_err(upload_error)?;
    tracing::debug!(path = %path.display(), bytes = file.data.len(), "Stored upload");

    let text = tokio::task::spawn_blocking(move || extract_text(&path))
        .await
        .map_err(|error| ProcessingError::Task(error.to_string()))?
        .map_err(|source| ProcessingError::Extraction {
            file: name.clone(),
            source,
        })?;

    Ok(InputItem::new(name, text))
}

#[async_trait]
impl SummaryApi for SummaryService {
    async fn summarize_batch(&self, batch: SummaryBatch) -> Result<BatchOutcome, ProcessingError> {
        SummaryService::summarize_batch(self, batch).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        SummaryService::metrics_snapshot(self)
    }
}
