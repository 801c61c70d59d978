//! CLI command implementations
//!
//! Each command module handles argument parsing and execution for one
//! subcommand.

pub mod completions;
pub mod config;
pub mod extract;
pub mod ingest;
pub mod status;

// Re-export argument types for use in mod.rs
pub use completions::CompletionsArgs;
pub use config::ConfigArgs;
pub use extract::ExtractArgs;
pub use ingest::IngestArgs;
pub use status::StatusArgs;
