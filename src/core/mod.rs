//! Core domain logic
//!
//! Everything below is independent of the command-line surface.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **warc**: Archive splitting, charset recovery and record parsing
//! - **extract**: HTML to title/body reduction and domain derivation
//! - **storage**: Index backend trait and the Tantivy implementation
//! - **ingest**: Corpus walking, progress ledger and the worker pipeline
//! - **services**: Unified service container

pub mod config;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod services;
pub mod storage;
pub mod types;
pub mod warc;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{Result, WarcdexError};
pub use services::Services;
