//! Core data types shared across the ingestion pipeline.

use serde::{Deserialize, Serialize};

/// An indexable document reduced from one archive record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    /// Stable external record identifier
    #[serde(rename = "_id")]
    pub id: String,

    /// Source URL
    pub url: String,

    /// Host of `url`, normalized for grouping
    pub domain: String,

    /// Page title, empty when absent
    pub title: String,

    /// Plain-text body, empty when absent
    pub body: String,
}

impl ExtractedDocument {
    /// Approximate payload size used for byte-based batching
    pub fn byte_size(&self) -> usize {
        self.id.len() + self.url.len() + self.domain.len() + self.title.len() + self.body.len()
    }
}

/// Per-file accounting from the extraction stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    /// Record spans seen, excluding the file info record
    pub records_seen: usize,

    /// Documents handed downstream
    pub documents_emitted: usize,

    /// Records dropped as malformed or missing required fields
    pub records_dropped: usize,

    /// Emitted documents whose content was blank
    pub empty_documents: usize,
}

/// Run-wide statistics returned by the orchestrator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestStats {
    /// Archive files found under the corpus root
    pub files_found: usize,

    /// Files skipped because the progress ledger already had them
    pub files_already_done: usize,

    /// Files fully processed and appended to the ledger in this run
    pub files_completed: usize,

    /// Files that failed and will be retried on the next run
    pub files_failed: usize,

    /// Record spans seen across all completed files
    pub records_seen: usize,

    /// Records dropped across all completed files
    pub records_dropped: usize,

    /// Documents accepted by the index
    pub documents_indexed: usize,

    /// Documents the index refused (written to the skip report)
    pub documents_rejected: usize,

    /// Wall time in milliseconds
    pub duration_ms: u64,
}
