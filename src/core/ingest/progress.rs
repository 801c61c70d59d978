//! Throughput reporting for long ingestion runs.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::core::types::ExtractedDocument;

/// Point-in-time throughput figures
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProgressSnapshot {
    pub documents: usize,
    pub files: usize,
    pub elapsed_seconds: f64,
    pub docs_per_second: f64,
    /// Mean worker time per document across finished files
    pub mean_latency_ms: f64,
}

/// Shared progress counters, logged every `interval` documents
#[derive(Debug)]
pub struct ProgressTracker {
    start_time: Instant,
    interval: usize,
    documents: AtomicUsize,
    files: AtomicUsize,
    /// Documents belonging to finished files
    timed_documents: AtomicUsize,
    /// Worker time spent on finished files
    busy_nanos: AtomicU64,
}

impl ProgressTracker {
    pub fn new(interval: usize) -> Self {
        Self {
            start_time: Instant::now(),
            interval: interval.max(1),
            documents: AtomicUsize::new(0),
            files: AtomicUsize::new(0),
            timed_documents: AtomicUsize::new(0),
            busy_nanos: AtomicU64::new(0),
        }
    }

    /// Count one document handed to the index
    pub fn document_done(&self) {
        let done = self.documents.fetch_add(1, Ordering::Relaxed) + 1;
        if done % self.interval == 0 {
            let s = self.snapshot();
            tracing::info!(
                "Progress: {} docs ({} files) | {:.1} docs/s | elapsed {} | {:.2} ms/doc",
                s.documents,
                s.files,
                s.docs_per_second,
                format_elapsed(s.elapsed_seconds),
                s.mean_latency_ms
            );
        }
    }

    /// Record a finished file and the worker time it took
    pub fn file_done(&self, documents: usize, elapsed: Duration) {
        self.files.fetch_add(1, Ordering::Relaxed);
        self.timed_documents.fetch_add(documents, Ordering::Relaxed);
        self.busy_nanos
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Wrap a document stream so each document is counted as it is pulled
    pub fn observe<I>(&self, inner: I) -> Observed<'_, I>
    where
        I: Iterator<Item = ExtractedDocument>,
    {
        Observed {
            inner,
            tracker: self,
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        let elapsed_seconds = self.start_time.elapsed().as_secs_f64();
        let documents = self.documents.load(Ordering::Relaxed);
        let timed = self.timed_documents.load(Ordering::Relaxed);
        let busy_ms = self.busy_nanos.load(Ordering::Relaxed) as f64 / 1_000_000.0;

        ProgressSnapshot {
            documents,
            files: self.files.load(Ordering::Relaxed),
            elapsed_seconds,
            docs_per_second: if elapsed_seconds > 0.0 {
                documents as f64 / elapsed_seconds
            } else {
                0.0
            },
            mean_latency_ms: if timed > 0 { busy_ms / timed as f64 } else { 0.0 },
        }
    }

    /// Log the end-of-run summary
    pub fn log_summary(&self) {
        let s = self.snapshot();
        tracing::info!(
            "Ingestion finished: {} docs from {} files in {} ({:.1} docs/s, {:.2} ms/doc)",
            s.documents,
            s.files,
            format_elapsed(s.elapsed_seconds),
            s.docs_per_second,
            s.mean_latency_ms
        );
    }
}

/// Document stream that reports to a [`ProgressTracker`]
pub struct Observed<'a, I> {
    inner: I,
    tracker: &'a ProgressTracker,
}

impl<I> Iterator for Observed<'_, I>
where
    I: Iterator<Item = ExtractedDocument>,
{
    type Item = ExtractedDocument;

    fn next(&mut self) -> Option<Self::Item> {
        let doc = self.inner.next()?;
        self.tracker.document_done();
        Some(doc)
    }
}

/// `1h02m03s` style duration
pub fn format_elapsed(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h{m:02}m{s:02}s")
    } else if m > 0 {
        format!("{m}m{s:02}s")
    } else {
        format!("{:.1}s", seconds.max(0.0))
    }
}
