//! warcdex - resumable full-text ingestion of ClueWeb12 WARC archives
//!
//! Decodes gzip-compressed WARC files, reduces each HTML response to a
//! title and a plain-text body, and bulk-loads the result into a Tantivy
//! index. A durable progress ledger lets an interrupted run resume
//! without reprocessing finished archives.
//!
//! # Architecture
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg
//!   - warc (record splitting and decoding)
//!   - extract (text reduction, domains)
//!   - storage (index backend, Tantivy)
//!   - ingest (walker, ledger, workers)
//!   - services (unified service container)
//!
//! - **cli**: Command-line adapter (depends on core)

// Core domain logic
pub mod core;

// Command-line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use crate::core::config::Config;
pub use crate::core::error::{Result, WarcdexError};
pub use crate::core::services::Services;
pub use crate::core::storage::{IndexBackend, IndexMetadata, TantivyBackend};
pub use crate::core::types::*;
