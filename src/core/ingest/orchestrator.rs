//! Ingestion orchestration.
//!
//! Coordinates one ingestion job:
//! 1. Open (or reset) the progress ledger
//! 2. Ensure the target index exists
//! 3. Walk the corpus and drop files the ledger already has
//! 4. Run the file extraction stage on a worker pool, one file per worker
//! 5. Write the skip report once at the end
//!
//! A file is appended to the ledger only after its document stream was
//! fully drained and the index committed every accepted document.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rand::seq::SliceRandom;
use rayon::prelude::*;

use crate::core::config::{Config, IngestConfig};
use crate::core::error::{Result, WarcdexError};
use crate::core::ingest::ledger::{ledger_key, ProgressLedger};
use crate::core::ingest::progress::ProgressTracker;
use crate::core::ingest::skip::SkipReport;
use crate::core::ingest::stage::FileExtractor;
use crate::core::ingest::walker::CorpusWalker;
use crate::core::storage::{IndexBackend, IndexSettings};
use crate::core::types::IngestStats;

/// Files left to process after consulting the ledger
#[derive(Debug, Clone, Default)]
pub struct IngestPlan {
    pub pending: Vec<PathBuf>,
    pub files_found: usize,
    pub files_already_done: usize,
}

/// Drives a resumable ingestion job
pub struct Orchestrator {
    config: Arc<Config>,
    backend: Arc<dyn IndexBackend>,
    extractor: FileExtractor,
}

impl Orchestrator {
    pub fn new(config: Arc<Config>, backend: Arc<dyn IndexBackend>) -> Self {
        let extractor = FileExtractor::new(config.corpus.version.clone());
        Self {
            config,
            backend,
            extractor,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the whole job
    ///
    /// Record- and file-level failures are logged and counted. Ledger,
    /// storage and configuration failures stop the job and are returned;
    /// the skip report is still written in that case.
    pub fn run(&self) -> Result<IngestStats> {
        let start = Instant::now();
        let index = &self.config.index;

        let ledger = open_ledger(&self.config.ingest)?;

        self.backend.ensure_index(
            &index.name,
            &IndexSettings::from_config(index),
            index.allow_overwrite,
        )?;

        let plan = self.plan(&ledger)?;
        tracing::info!(
            "Found {} archives, {} already done, {} to process",
            plan.files_found,
            plan.files_already_done,
            plan.pending.len()
        );

        let stats = Mutex::new(IngestStats {
            files_found: plan.files_found,
            files_already_done: plan.files_already_done,
            ..IngestStats::default()
        });
        let skips = SkipReport::new();
        let progress = ProgressTracker::new(self.config.ingest.progress_interval);

        let result = self.process_all(&plan.pending, &ledger, &skips, &progress, &stats);

        let written = skips.write_to(&self.config.ingest.skip_file);
        progress.log_summary();
        if let Err(e) = result {
            if let Err(write_err) = written {
                tracing::error!("Failed to write skip report: {}", write_err);
            }
            return Err(e);
        }
        written?;

        let mut stats = stats.into_inner().unwrap_or_else(|e| e.into_inner());
        stats.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Job complete: {} files done, {} failed, {} indexed, {} rejected, {} records dropped",
            stats.files_completed,
            stats.files_failed,
            stats.documents_indexed,
            stats.documents_rejected,
            stats.records_dropped
        );

        Ok(stats)
    }

    /// Enumerate archives, optionally shuffle, and filter out completed ones
    pub fn plan(&self, ledger: &ProgressLedger) -> Result<IngestPlan> {
        let corpus = &self.config.corpus;
        let walker = CorpusWalker::from_config(corpus)?;
        // Ledger keys must not depend on the working directory or root spelling
        let root = std::fs::canonicalize(&corpus.root).map_err(|e| {
            let root = &corpus.root;
            WarcdexError::InvalidPath(format!("Corpus root {root:?} is not a directory: {e}"))
        })?;
        let mut files = walker.collect_files(&root)?;

        if corpus.shuffle {
            files.shuffle(&mut rand::thread_rng());
        }

        let files_found = files.len();
        let pending: Vec<_> = files
            .into_iter()
            .filter(|path| !ledger.contains(&ledger_key(path)))
            .collect();

        Ok(IngestPlan {
            files_already_done: files_found - pending.len(),
            files_found,
            pending,
        })
    }

    fn process_all(
        &self,
        files: &[PathBuf],
        ledger: &ProgressLedger,
        skips: &SkipReport,
        progress: &ProgressTracker,
        stats: &Mutex<IngestStats>,
    ) -> Result<()> {
        let workers = self.config.ingest.worker_count();
        tracing::info!("Starting {} workers", workers);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("warcdex-worker-{i}"))
            .build()
            .map_err(|e| WarcdexError::ConfigError(format!("Failed to build worker pool: {e}")))?;

        pool.install(|| {
            files
                .par_iter()
                .with_max_len(1)
                .try_for_each(|path| match self.process_file(path, ledger, skips, progress) {
                    Ok(outcome) => {
                        let mut stats = stats.lock().unwrap_or_else(|e| e.into_inner());
                        stats.files_completed += 1;
                        stats.records_seen += outcome.records_seen;
                        stats.records_dropped += outcome.records_dropped;
                        stats.documents_indexed += outcome.indexed;
                        stats.documents_rejected += outcome.rejected;
                        Ok(())
                    }
                    Err(e) if !e.is_fatal() => {
                        tracing::warn!("Failed to process {:?}, will retry next run: {}", path, e);
                        stats.lock().unwrap_or_else(|e| e.into_inner()).files_failed += 1;
                        Ok(())
                    }
                    Err(e) => {
                        tracing::error!("Fatal error while processing {:?}: {}", path, e);
                        Err(e)
                    }
                })
        })
    }

    /// Extract, index and mark one file
    fn process_file(
        &self,
        path: &Path,
        ledger: &ProgressLedger,
        skips: &SkipReport,
        progress: &ProgressTracker,
    ) -> Result<FileOutcome> {
        let started = Instant::now();
        let index = &self.config.index;

        let extraction = self.extractor.open(path)?;
        let mut documents = extraction.documents();

        let response = {
            let mut observed = progress.observe(&mut documents);
            self.backend
                .bulk(&index.name, &mut observed, index.batch_bytes)?
        };

        if !documents.is_exhausted() {
            return Err(WarcdexError::IndexingFailed(format!(
                "{path:?} was not fully consumed by the index"
            )));
        }

        let extraction_stats = documents.stats();
        let rejected = response.rejected.len();
        skips.record(response.rejected);

        ledger.append(&ledger_key(path))?;
        progress.file_done(extraction_stats.documents_emitted, started.elapsed());

        tracing::debug!(
            "Completed {:?}: {} records, {} indexed, {} rejected, {} dropped",
            path,
            extraction_stats.records_seen,
            response.indexed,
            rejected,
            extraction_stats.records_dropped
        );

        Ok(FileOutcome {
            records_seen: extraction_stats.records_seen,
            records_dropped: extraction_stats.records_dropped,
            indexed: response.indexed,
            rejected,
        })
    }
}

struct FileOutcome {
    records_seen: usize,
    records_dropped: usize,
    indexed: usize,
    rejected: usize,
}

/// Open the ledger the way the ingest settings ask for
///
/// - `reset_progress`: start over with an empty log
/// - `require_progress_file`: a missing log is fatal
/// - otherwise: create the log if absent
pub fn open_ledger(config: &IngestConfig) -> Result<ProgressLedger> {
    if config.reset_progress {
        ProgressLedger::initialize(&config.progress_file, true)
    } else if config.require_progress_file {
        ProgressLedger::open(&config.progress_file)
    } else {
        ProgressLedger::initialize(&config.progress_file, false)
    }
}
