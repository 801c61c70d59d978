//! Indexing boundary.
//!
//! The pipeline only talks to the search index through [`IndexBackend`]:
//! create the index once per job, then stream documents into it in
//! byte-sized batches.

use serde::{Deserialize, Serialize};

use crate::core::config::IndexConfig;
use crate::core::error::Result;
use crate::core::types::ExtractedDocument;

/// Settings document stored with an index when it is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSettings {
    /// Writer heap in bytes
    pub writer_heap_bytes: usize,

    /// Documents above this size are rejected
    pub max_document_bytes: usize,
}

impl IndexSettings {
    pub fn from_config(config: &IndexConfig) -> Self {
        Self {
            writer_heap_bytes: config.writer_heap_mb * 1024 * 1024,
            max_document_bytes: config.max_document_bytes,
        }
    }
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self::from_config(&IndexConfig::default())
    }
}

/// Outcome of one bulk call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkResponse {
    /// Documents accepted and committed
    pub indexed: usize,

    /// Ids of documents the index refused, in submission order
    pub rejected: Vec<String>,
}

impl BulkResponse {
    pub fn merge(&mut self, other: BulkResponse) {
        self.indexed += other.indexed;
        self.rejected.extend(other.rejected);
    }
}

/// A search index that accepts extracted documents
///
/// Implementations are shared across worker threads.
pub trait IndexBackend: Send + Sync {
    /// Make sure `name` exists
    ///
    /// An existing index is kept unless `allow_overwrite` is set.
    fn ensure_index(
        &self,
        name: &str,
        settings: &IndexSettings,
        allow_overwrite: bool,
    ) -> Result<()>;

    /// Drain `documents` into `name`, batching by cumulative byte size
    ///
    /// Refused documents are reported in the response, not as errors.
    /// Every accepted document is durable when this returns.
    fn bulk(
        &self,
        name: &str,
        documents: &mut dyn Iterator<Item = ExtractedDocument>,
        batch_bytes: usize,
    ) -> Result<BulkResponse>;

    /// Number of documents currently searchable in `name`
    fn document_count(&self, name: &str) -> Result<u64>;
}

/// Split a document stream into batches of roughly `batch_bytes`
///
/// A batch closes once its cumulative size reaches the threshold, so a
/// single oversized document forms a batch of its own.
pub struct ByteBatches<'a> {
    documents: &'a mut dyn Iterator<Item = ExtractedDocument>,
    batch_bytes: usize,
}

impl<'a> ByteBatches<'a> {
    pub fn new(
        documents: &'a mut dyn Iterator<Item = ExtractedDocument>,
        batch_bytes: usize,
    ) -> Self {
        Self {
            documents,
            batch_bytes: batch_bytes.max(1),
        }
    }
}

impl Iterator for ByteBatches<'_> {
    type Item = Vec<ExtractedDocument>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::new();
        let mut size = 0;

        while let Some(doc) = self.documents.next() {
            size += doc.byte_size();
            batch.push(doc);
            if size >= self.batch_bytes {
                break;
            }
        }

        (!batch.is_empty()).then_some(batch)
    }
}
