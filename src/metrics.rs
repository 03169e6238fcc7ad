use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization activity.
#[derive(Default)]
pub struct SummaryMetrics {
    documents_summarized: AtomicU64,
    files_skipped: AtomicU64,
    summaries_failed: AtomicU64,
    characters_in: AtomicU64,
    characters_out: AtomicU64,
}

impl SummaryMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one summarized input item with its original and summary lengths in characters.
    pub fn record_summary(&self, original_chars: u64, summary_chars: u64, failed: bool) {
        self.documents_summarized.fetch_add(1, Ordering::Relaxed);
        self.characters_in
            .fetch_add(original_chars, Ordering::Relaxed);
        self.characters_out
            .fetch_add(summary_chars, Ordering::Relaxed);
        if failed {
            self.summaries_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record an upload rejected by the extension allow-list.
    pub fn record_skipped_file(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_summarized: self.documents_summarized.load(Ordering::Relaxed),
            files_skipped: self.files_skipped.load(Ordering::Relaxed),
            summaries_failed: self.summaries_failed.load(Ordering::Relaxed),
            characters_in: self.characters_in.load(Ordering::Relaxed),
            characters_out: self.characters_out.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of summarization counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of input items sent to the summarization client since startup.
    pub documents_summarized: u64,
    /// Number of uploads rejected by the extension allow-list.
    pub files_skipped: u64,
    /// Number of input items whose summarization returned an error message.
    pub summaries_failed: u64,
    /// Total characters of source text submitted for summarization.
    pub characters_in: u64,
    /// Total characters of summary text returned to callers.
    pub characters_out: u64,
}
