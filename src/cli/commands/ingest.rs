//! Ingest command - load a corpus into the index

use crate::cli::output::colors;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::ingest::{format_elapsed, Orchestrator};
use crate::core::services::Services;
use crate::core::storage::IndexBackend;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Corpus root (defaults to `corpus.root` from the configuration)
    pub corpus: Option<PathBuf>,

    /// Target index name
    #[arg(long)]
    pub index: Option<String>,

    /// Number of concurrent file workers
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Process archives in random order
    #[arg(long)]
    pub shuffle: bool,

    /// Glob on segment directory names (e.g. "ClueWeb12_0*")
    #[arg(long)]
    pub subset: Option<String>,

    /// Forget completed files and start from an empty progress log
    #[arg(long)]
    pub reset_progress: bool,

    /// Delete and recreate the index if it already exists
    #[arg(long)]
    pub overwrite_index: bool,

    /// Suppress the banner and info-level log lines, including periodic progress
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl IngestArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, base: &Config) -> crate::core::Result<Config> {
        let mut config = base.clone();

        if let Some(corpus) = &self.corpus {
            config.corpus.root = corpus.clone();
        }
        if let Some(index) = &self.index {
            config.index.name = index.clone();
        }
        if let Some(workers) = self.workers {
            config.ingest.workers = workers;
        }
        if let Some(subset) = &self.subset {
            config.corpus.subset_pattern = subset.clone();
        }
        config.corpus.shuffle |= self.shuffle;
        config.ingest.reset_progress |= self.reset_progress;
        config.index.allow_overwrite |= self.overwrite_index;

        config.validate()?;
        Ok(config)
    }
}

/// Ingestion result response
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub index: String,
    pub corpus: String,
    pub files_found: usize,
    pub files_already_done: usize,
    pub files_completed: usize,
    pub files_failed: usize,
    pub records_seen: usize,
    pub records_dropped: usize,
    pub documents_indexed: usize,
    pub documents_rejected: usize,
    pub duration_secs: f64,
    pub throughput_docs_per_sec: f64,
    pub skip_file: String,
}

/// Execute the ingest command
pub async fn execute(
    args: IngestArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.apply(&services.config)?;

    if !config.corpus.root.is_dir() {
        return Err(format!(
            "Corpus root '{}' is not a directory. Pass the corpus path or set corpus.root.",
            config.corpus.root.display()
        )
        .into());
    }

    if !args.quiet && format == OutputFormat::Human {
        eprintln!(
            "Ingesting {} into '{}' with {} workers...",
            colors::file_path(&config.corpus.root.display().to_string()),
            colors::name(&config.index.name),
            config.ingest.worker_count()
        );
    }
    config.log_config();

    let config = Arc::new(config);
    let backend: Arc<dyn IndexBackend> = services.backend.clone();
    let orchestrator = Orchestrator::new(Arc::clone(&config), backend);

    let stats = tokio::task::spawn_blocking(move || orchestrator.run()).await??;

    let duration_secs = stats.duration_ms as f64 / 1000.0;
    let throughput = if duration_secs > 0.0 {
        stats.documents_indexed as f64 / duration_secs
    } else {
        0.0
    };

    let response = IngestResponse {
        index: config.index.name.clone(),
        corpus: config.corpus.root.to_string_lossy().into_owned(),
        files_found: stats.files_found,
        files_already_done: stats.files_already_done,
        files_completed: stats.files_completed,
        files_failed: stats.files_failed,
        records_seen: stats.records_seen,
        records_dropped: stats.records_dropped,
        documents_indexed: stats.documents_indexed,
        documents_rejected: stats.documents_rejected,
        duration_secs,
        throughput_docs_per_sec: throughput,
        skip_file: config.ingest.skip_file.to_string_lossy().into_owned(),
    };

    match format {
        OutputFormat::Human => {
            println!(
                "{} {} documents from {} files in {}",
                colors::success("Indexed"),
                colors::number(&response.documents_indexed.to_string()),
                colors::number(&response.files_completed.to_string()),
                colors::number(&format_elapsed(response.duration_secs))
            );
            println!(
                "Files: {} found, {} already done, {} failed",
                colors::number(&response.files_found.to_string()),
                colors::number(&response.files_already_done.to_string()),
                colors::number(&response.files_failed.to_string())
            );
            println!(
                "Records: {} seen, {} dropped, {} rejected by the index",
                colors::number(&response.records_seen.to_string()),
                colors::number(&response.records_dropped.to_string()),
                colors::number(&response.documents_rejected.to_string())
            );
            println!(
                "Throughput: {} docs/sec",
                colors::number(&format!("{:.0}", response.throughput_docs_per_sec))
            );
            if response.files_failed > 0 {
                println!(
                    "{}",
                    colors::warning("Some files failed; run ingest again to retry them.")
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
