//! Named index management.
//!
//! Every index lives in its own directory under the storage root, with
//! the settings document next to the Tantivy files:
//!
//! ```text
//! {storage_root}/
//! ├── {index-name}/
//! │   ├── settings.json       # IndexMetadata (settings + schema version)
//! │   ├── meta.json           # Tantivy
//! │   └── [segment files]
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, WarcdexError};
use crate::core::storage::backend::{BulkResponse, ByteBatches, IndexBackend, IndexSettings};
use crate::core::storage::tantivy::{TantivyIndex, SCHEMA_VERSION};
use crate::core::types::ExtractedDocument;

const SETTINGS_FILE: &str = "settings.json";

/// Persisted description of an index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub schema_version: u32,
    pub settings: IndexSettings,
}

/// An open index with the settings it was ensured with
struct OpenIndex {
    index: TantivyIndex,
    settings: IndexSettings,
}

/// Tantivy-backed implementation of the indexing boundary
///
/// Indexes opened for writing are cached so that all workers share one
/// writer per index. Counts and lookups never create a writer.
pub struct TantivyBackend {
    storage_root: PathBuf,
    open: RwLock<HashMap<String, Arc<OpenIndex>>>,
}

impl TantivyBackend {
    /// Create a backend rooted at `storage_root`
    pub fn new(storage_root: PathBuf) -> Self {
        Self {
            storage_root,
            open: RwLock::new(HashMap::new()),
        }
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    fn index_dir(&self, name: &str) -> PathBuf {
        self.storage_root.join(name)
    }

    fn settings_path(&self, name: &str) -> PathBuf {
        self.index_dir(name).join(SETTINGS_FILE)
    }

    /// Check if an index exists on disk
    pub fn index_exists(&self, name: &str) -> bool {
        self.settings_path(name).exists()
    }

    /// Read an index's settings document
    pub fn metadata(&self, name: &str) -> Result<IndexMetadata> {
        let path = self.settings_path(name);
        if !path.exists() {
            return Err(WarcdexError::IndexNotFound(name.to_string()));
        }

        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_metadata(&self, metadata: &IndexMetadata) -> Result<()> {
        let json = serde_json::to_string_pretty(metadata)?;
        fs::write(self.settings_path(&metadata.name), json)?;
        Ok(())
    }

    /// Delete an index from disk and from the open-index cache
    pub fn delete_index(&self, name: &str) -> Result<()> {
        self.open
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name);

        let dir = self.index_dir(name);
        if !dir.exists() {
            return Err(WarcdexError::IndexNotFound(name.to_string()));
        }
        fs::remove_dir_all(dir)?;
        Ok(())
    }

    /// Names of all indexes under the storage root
    pub fn list_indexes(&self) -> Result<Vec<IndexMetadata>> {
        if !self.storage_root.exists() {
            return Ok(Vec::new());
        }

        let mut indexes = Vec::new();
        for entry in fs::read_dir(&self.storage_root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if let Ok(metadata) = self.metadata(name) {
                    indexes.push(metadata);
                }
            }
        }
        indexes.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(indexes)
    }

    fn create_index(&self, name: &str, settings: &IndexSettings) -> Result<TantivyIndex> {
        let index = TantivyIndex::create(&self.index_dir(name), settings.writer_heap_bytes)?;
        self.write_metadata(&IndexMetadata {
            name: name.to_string(),
            created_at: Utc::now(),
            schema_version: SCHEMA_VERSION,
            settings: settings.clone(),
        })?;
        Ok(index)
    }

    /// Settings document of an index this build can read
    fn current_metadata(&self, name: &str) -> Result<IndexMetadata> {
        let metadata = self.metadata(name)?;
        if metadata.schema_version != SCHEMA_VERSION {
            return Err(WarcdexError::StorageError(format!(
                "Index '{}' uses schema version {} (current: v{}). \
                 Re-run with --overwrite-index to rebuild it.",
                name, metadata.schema_version, SCHEMA_VERSION
            )));
        }
        Ok(metadata)
    }

    fn open_existing(&self, name: &str, settings: &IndexSettings) -> Result<TantivyIndex> {
        self.current_metadata(name)?;
        TantivyIndex::open(&self.index_dir(name), settings.writer_heap_bytes)
    }

    /// Run a read against the cached writable handle if there is one,
    /// otherwise against a throwaway read-only view
    fn read<T>(&self, name: &str, f: impl FnOnce(&TantivyIndex) -> Result<T>) -> Result<T> {
        let cached = self
            .open
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .map(Arc::clone);
        if let Some(open) = cached {
            return f(&open.index);
        }

        self.current_metadata(name)?;
        f(&TantivyIndex::open_read_only(&self.index_dir(name))?)
    }

    /// Cached writable handle, opening the index from disk on first use
    fn handle(&self, name: &str) -> Result<Arc<OpenIndex>> {
        if let Some(open) = self
            .open
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
        {
            return Ok(Arc::clone(open));
        }

        let mut cache = self.open.write().unwrap_or_else(|e| e.into_inner());
        if let Some(open) = cache.get(name) {
            return Ok(Arc::clone(open));
        }

        let metadata = self.metadata(name)?;
        let index = self.open_existing(name, &metadata.settings)?;
        let open = Arc::new(OpenIndex {
            index,
            settings: metadata.settings,
        });
        cache.insert(name.to_string(), Arc::clone(&open));
        Ok(open)
    }

    /// Stored documents with the given id
    pub fn find_by_id(&self, name: &str, id: &str) -> Result<Vec<ExtractedDocument>> {
        self.read(name, |index| index.find_by_id(id))
    }
}

impl IndexBackend for TantivyBackend {
    fn ensure_index(
        &self,
        name: &str,
        settings: &IndexSettings,
        allow_overwrite: bool,
    ) -> Result<()> {
        let mut cache = self.open.write().unwrap_or_else(|e| e.into_inner());

        let index = if self.index_exists(name) && !allow_overwrite {
            tracing::info!("Using existing index '{}'", name);
            // Release any previous writer before taking the directory lock again
            cache.remove(name);
            self.open_existing(name, settings)?
        } else {
            let dir = self.index_dir(name);
            if dir.exists() {
                if !allow_overwrite {
                    return Err(WarcdexError::StorageError(format!(
                        "{dir:?} exists but holds no index settings; \
                         refusing to replace it without --overwrite-index"
                    )));
                }
                tracing::warn!("Overwriting existing index '{}'", name);
                cache.remove(name);
                fs::remove_dir_all(&dir)?;
            }
            tracing::info!("Creating index '{}' in {:?}", name, self.index_dir(name));
            self.create_index(name, settings)?
        };

        cache.insert(
            name.to_string(),
            Arc::new(OpenIndex {
                index,
                settings: settings.clone(),
            }),
        );
        Ok(())
    }

    fn bulk(
        &self,
        name: &str,
        documents: &mut dyn Iterator<Item = ExtractedDocument>,
        batch_bytes: usize,
    ) -> Result<BulkResponse> {
        let open = self.handle(name)?;
        let mut response = BulkResponse::default();

        for batch in ByteBatches::new(documents, batch_bytes) {
            let (indexed, rejected) = open
                .index
                .write_batch(batch, open.settings.max_document_bytes)?;
            response.merge(BulkResponse { indexed, rejected });
        }

        Ok(response)
    }

    fn document_count(&self, name: &str) -> Result<u64> {
        self.read(name, TantivyIndex::num_docs)
    }
}
