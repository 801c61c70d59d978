//! Storage layer for the search index.
//!
//! # Architecture
//!
//! - **IndexBackend**: the indexing boundary the pipeline writes through
//! - **TantivyBackend**: manages named on-disk Tantivy indexes
//! - **TantivyIndex**: wraps one Tantivy index and its writer

mod backend;
mod manager;
mod tantivy;

pub use backend::{BulkResponse, ByteBatches, IndexBackend, IndexSettings};
pub use manager::{IndexMetadata, TantivyBackend};
pub use tantivy::{create_schema, TantivyIndex, SCHEMA_VERSION};
