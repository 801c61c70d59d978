//! Tantivy integration for document storage.
//!
//! Wraps one on-disk Tantivy index holding extracted web documents.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use tantivy::schema::*;
use tantivy::{doc, Index, IndexWriter, TantivyDocument, Term};

use crate::core::error::{Result, WarcdexError};
use crate::core::types::ExtractedDocument;

/// Current schema version
/// Version 1: `_id`, `url`, `domain`, `title`, `body`, `indexed_at`
pub const SCHEMA_VERSION: u32 = 1;

/// Create the Tantivy schema for web documents
///
/// Fields:
/// - _id: External record identifier (STRING | STORED)
/// - url: Source URL (STRING | STORED)
/// - domain: Normalized host (STRING | STORED)
/// - title: Page title (TEXT | STORED)
/// - body: Page text (TEXT | STORED)
/// - indexed_at: Timestamp (Date | STORED)
pub fn create_schema() -> Schema {
    let mut builder = Schema::builder();

    // Exact-match identifiers
    builder.add_text_field("_id", STRING | STORED);
    builder.add_text_field("url", STRING | STORED);
    builder.add_text_field("domain", STRING | STORED);

    // Searchable text
    builder.add_text_field("title", TEXT | STORED);
    builder.add_text_field("body", TEXT | STORED);

    builder.add_date_field("indexed_at", STORED);

    builder.build()
}

/// Resolved schema fields
#[derive(Debug, Clone, Copy)]
struct DocumentFields {
    id: Field,
    url: Field,
    domain: Field,
    title: Field,
    body: Field,
    indexed_at: Field,
}

impl DocumentFields {
    fn resolve(schema: &Schema) -> Result<Self> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| WarcdexError::StorageError(format!("Missing {name} field: {e}")))
        };

        Ok(Self {
            id: field("_id")?,
            url: field("url")?,
            domain: field("domain")?,
            title: field("title")?,
            body: field("body")?,
            indexed_at: field("indexed_at")?,
        })
    }
}

/// Tantivy index wrapper
///
/// The writer sits behind a mutex so concurrent callers commit whole
/// batches one at a time. Read-only handles carry no writer and never
/// take the directory lock.
pub struct TantivyIndex {
    index: Index,
    fields: DocumentFields,
    writer: Option<Mutex<IndexWriter>>,
}

impl std::fmt::Debug for TantivyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivyIndex")
            .field("schema", &"<schema>")
            .finish()
    }
}

impl TantivyIndex {
    /// Create a new Tantivy index at the given path
    pub fn create(index_dir: &Path, writer_heap_bytes: usize) -> Result<Self> {
        std::fs::create_dir_all(index_dir)?;

        let index = Index::create_in_dir(index_dir, create_schema())
            .map_err(|e| WarcdexError::StorageError(format!("Failed to create index: {e}")))?;

        Self::from_index(index, Some(writer_heap_bytes))
    }

    /// Open an existing Tantivy index for writing
    pub fn open(index_dir: &Path, writer_heap_bytes: usize) -> Result<Self> {
        Self::from_index(open_in_dir(index_dir)?, Some(writer_heap_bytes))
    }

    /// Open an existing Tantivy index for counts and lookups only
    pub fn open_read_only(index_dir: &Path) -> Result<Self> {
        Self::from_index(open_in_dir(index_dir)?, None)
    }

    fn from_index(index: Index, writer_heap_bytes: Option<usize>) -> Result<Self> {
        let fields = DocumentFields::resolve(&index.schema())?;

        let writer = match writer_heap_bytes {
            Some(heap) => Some(Mutex::new(index.writer(heap).map_err(|e| {
                WarcdexError::StorageError(format!("Failed to create writer: {e}"))
            })?)),
            None => None,
        };

        Ok(Self {
            index,
            fields,
            writer,
        })
    }

    pub fn is_writable(&self) -> bool {
        self.writer.is_some()
    }

    /// Add one batch and commit it
    ///
    /// Documents already stored under the same `_id` are replaced.
    /// Documents larger than `max_document_bytes`, or that the writer
    /// refuses, are skipped and returned by id. On commit failure the
    /// batch is rolled back and nothing from it is kept.
    pub fn write_batch(
        &self,
        batch: Vec<ExtractedDocument>,
        max_document_bytes: usize,
    ) -> Result<(usize, Vec<String>)> {
        let fields = self.fields;
        let now = tantivy::DateTime::from_timestamp_secs(Utc::now().timestamp());

        let mut writer = self
            .writer
            .as_ref()
            .ok_or_else(|| WarcdexError::StorageError("Index is open read-only".to_string()))?
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        let mut added = 0;
        let mut rejected = Vec::new();

        for document in batch {
            if document.byte_size() > max_document_bytes {
                tracing::debug!(
                    "Rejecting {} ({} bytes, limit {})",
                    document.id,
                    document.byte_size(),
                    max_document_bytes
                );
                rejected.push(document.id);
                continue;
            }

            writer.delete_term(Term::from_field_text(fields.id, &document.id));

            let result = writer.add_document(doc!(
                fields.id => document.id.as_str(),
                fields.url => document.url.as_str(),
                fields.domain => document.domain.as_str(),
                fields.title => document.title.as_str(),
                fields.body => document.body.as_str(),
                fields.indexed_at => now,
            ));

            match result {
                Ok(_) => added += 1,
                Err(e) => {
                    tracing::warn!("Index refused {}: {}", document.id, e);
                    rejected.push(document.id);
                }
            }
        }

        if let Err(e) = writer.commit() {
            if let Err(rollback) = writer.rollback() {
                tracing::error!("Rollback after failed commit also failed: {}", rollback);
            }
            return Err(WarcdexError::IndexingFailed(format!(
                "Failed to commit batch: {e}"
            )));
        }

        Ok((added, rejected))
    }

    /// Number of committed documents
    pub fn num_docs(&self) -> Result<u64> {
        let reader = self
            .index
            .reader()
            .map_err(|e| WarcdexError::StorageError(format!("Failed to create reader: {e}")))?;
        Ok(reader.searcher().num_docs())
    }

    /// Stored documents with the given `_id`
    pub fn find_by_id(&self, id: &str) -> Result<Vec<ExtractedDocument>> {
        use tantivy::collector::TopDocs;
        use tantivy::query::TermQuery;

        let reader = self
            .index
            .reader()
            .map_err(|e| WarcdexError::StorageError(format!("Failed to create reader: {e}")))?;
        let searcher = reader.searcher();

        let query = TermQuery::new(
            Term::from_field_text(self.fields.id, id),
            IndexRecordOption::Basic,
        );
        let hits = searcher
            .search(&query, &TopDocs::with_limit(16))
            .map_err(|e| WarcdexError::StorageError(format!("Lookup failed: {e}")))?;

        let mut documents = Vec::with_capacity(hits.len());
        for (_score, address) in hits {
            let stored: TantivyDocument = searcher
                .doc(address)
                .map_err(|e| WarcdexError::StorageError(format!("Failed to load doc: {e}")))?;
            documents.push(self.to_document(&stored));
        }
        Ok(documents)
    }

    fn to_document(&self, stored: &TantivyDocument) -> ExtractedDocument {
        let text = |field: Field| {
            stored
                .get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string()
        };

        ExtractedDocument {
            id: text(self.fields.id),
            url: text(self.fields.url),
            domain: text(self.fields.domain),
            title: text(self.fields.title),
            body: text(self.fields.body),
        }
    }
}

fn open_in_dir(index_dir: &Path) -> Result<Index> {
    Index::open_in_dir(index_dir)
        .map_err(|e| WarcdexError::StorageError(format!("Failed to open index: {e}")))
}
