//! Resumable ingestion pipeline.
//!
//! Archives are discovered by the [`CorpusWalker`], turned into document
//! streams by the [`FileExtractor`] and pushed to an index backend by the
//! [`Orchestrator`]. The [`ProgressLedger`] records finished files so an
//! interrupted job picks up where it stopped.

pub mod ledger;
pub mod orchestrator;
pub mod progress;
pub mod skip;
pub mod stage;
pub mod walker;

pub use ledger::{ledger_key, ProgressLedger};
pub use orchestrator::{open_ledger, IngestPlan, Orchestrator};
pub use progress::{format_elapsed, ProgressSnapshot, ProgressTracker};
pub use skip::SkipReport;
pub use stage::{decompress, ExtractedDocuments, FileExtraction, FileExtractor};
pub use walker::CorpusWalker;
