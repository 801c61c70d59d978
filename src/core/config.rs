//! Configuration management for warcdex.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with documented defaults for all settings.

use crate::core::error::{Result, WarcdexError};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Where the archives live and how they are recognised
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CorpusConfig {
    /// Corpus root holding one subdirectory per corpus segment
    #[serde(default = "default_corpus_root")]
    pub root: PathBuf,

    /// Glob matched against segment subdirectory names
    #[serde(default = "default_subset_pattern")]
    pub subset_pattern: String,

    /// Glob matched against archive file names
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,

    /// Archive format version; record spans start at `WARC/{version}`
    #[serde(default = "default_version")]
    pub version: String,

    /// Randomize file processing order
    #[serde(default)]
    pub shuffle: bool,
}

/// Target search index
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    /// Index name
    #[serde(default = "default_index_name")]
    pub name: String,

    /// Root directory for index storage
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Cumulative document bytes per bulk batch
    #[serde(default = "default_batch_bytes")]
    pub batch_bytes: usize,

    /// Documents larger than this are refused by the index
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: usize,

    /// Index writer heap in MB
    #[serde(default = "default_writer_heap_mb")]
    pub writer_heap_mb: usize,

    /// Allow an existing index to be dropped and recreated
    #[serde(default)]
    pub allow_overwrite: bool,
}

/// Run state and worker pool
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IngestConfig {
    /// Append-only log of fully processed archive files
    #[serde(default = "default_progress_file")]
    pub progress_file: PathBuf,

    /// Document ids the index refused, rewritten at job end
    #[serde(default = "default_skip_file")]
    pub skip_file: PathBuf,

    /// Start over with an empty progress log
    #[serde(default)]
    pub reset_progress: bool,

    /// Fail instead of creating the progress log when it is missing
    #[serde(default)]
    pub require_progress_file: bool,

    /// Worker count (0 = derive from available parallelism)
    #[serde(default)]
    pub workers: usize,

    /// Fraction of cores left for other load when deriving workers
    #[serde(default = "default_reserved_fraction")]
    pub reserved_fraction: f64,

    /// Log a progress line every N documents
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

// Default value functions
fn default_corpus_root() -> PathBuf {
    PathBuf::from("./corpus")
}

fn default_subset_pattern() -> String {
    "ClueWeb12_*".to_string()
}

fn default_file_pattern() -> String {
    "*.warc.gz".to_string()
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_index_name() -> String {
    "clueweb12".to_string()
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./data/indexes")
}

fn default_batch_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_max_document_bytes() -> usize {
    5 * 1024 * 1024
}

fn default_writer_heap_mb() -> usize {
    50
}

fn default_progress_file() -> PathBuf {
    PathBuf::from("./data/progress.log")
}

fn default_skip_file() -> PathBuf {
    PathBuf::from("./data/skipped.txt")
}

fn default_reserved_fraction() -> f64 {
    0.25
}

fn default_progress_interval() -> usize {
    1000
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            root: default_corpus_root(),
            subset_pattern: default_subset_pattern(),
            file_pattern: default_file_pattern(),
            version: default_version(),
            shuffle: false,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            name: default_index_name(),
            storage_dir: default_storage_dir(),
            batch_bytes: default_batch_bytes(),
            max_document_bytes: default_max_document_bytes(),
            writer_heap_mb: default_writer_heap_mb(),
            allow_overwrite: false,
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            progress_file: default_progress_file(),
            skip_file: default_skip_file(),
            reset_progress: false,
            require_progress_file: false,
            workers: 0,
            reserved_fraction: default_reserved_fraction(),
            progress_interval: default_progress_interval(),
        }
    }
}

impl IngestConfig {
    /// Number of concurrent file workers for this machine
    ///
    /// An explicit `workers` value wins. Otherwise the available
    /// parallelism minus the reserved fraction, never less than one.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }

        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let usable = (cores as f64 * (1.0 - self.reserved_fraction)).floor() as usize;
        usable.max(1)
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| WarcdexError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. WARCDEX_CONFIG env var
    /// 2. XDG config file (~/.config/warcdex/config.toml)
    /// 3. ./warcdex.toml
    /// 4. Defaults
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("WARCDEX_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new("warcdex.toml").exists() {
                Self::from_file("warcdex.toml")?
            } else {
                Self::default()
            }
        };

        // Paths left at their defaults move under the XDG directories
        if config.index.storage_dir == default_storage_dir() {
            config.index.storage_dir = xdg.indexes_dir();
        }
        if config.ingest.progress_file == default_progress_file() {
            config.ingest.progress_file = xdg.progress_file();
        }
        if config.ingest.skip_file == default_skip_file() {
            config.ingest.skip_file = xdg.skip_report_file();
        }

        config.merge_env();
        config.validate()?;

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        if let Ok(root) = env::var("WARCDEX_CORPUS_ROOT") {
            self.corpus.root = PathBuf::from(root);
        }
        if let Ok(shuffle) = env::var("WARCDEX_SHUFFLE") {
            if let Ok(s) = shuffle.parse() {
                self.corpus.shuffle = s;
            }
        }

        if let Ok(name) = env::var("WARCDEX_INDEX_NAME") {
            self.index.name = name;
        }
        if let Ok(batch_bytes) = env::var("WARCDEX_BATCH_BYTES") {
            if let Ok(b) = batch_bytes.parse() {
                self.index.batch_bytes = b;
            }
        }

        if let Ok(workers) = env::var("WARCDEX_WORKERS") {
            if let Ok(w) = workers.parse() {
                self.ingest.workers = w;
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.corpus.version.trim().is_empty() {
            return Err(WarcdexError::ConfigError(
                "Archive version must be non-empty".to_string(),
            ));
        }

        for (what, pattern) in [
            ("subset", &self.corpus.subset_pattern),
            ("file", &self.corpus.file_pattern),
        ] {
            glob::Pattern::new(pattern).map_err(|e| {
                WarcdexError::ConfigError(format!("Invalid {what} pattern '{pattern}': {e}"))
            })?;
        }

        if self.index.name.trim().is_empty() {
            return Err(WarcdexError::ConfigError(
                "Index name must be non-empty".to_string(),
            ));
        }

        if self.index.batch_bytes == 0 {
            return Err(WarcdexError::ConfigError(
                "Batch bytes must be non-zero".to_string(),
            ));
        }

        if self.index.max_document_bytes == 0 {
            return Err(WarcdexError::ConfigError(
                "Max document bytes must be non-zero".to_string(),
            ));
        }

        if self.index.writer_heap_mb == 0 {
            return Err(WarcdexError::ConfigError(
                "Writer heap must be non-zero".to_string(),
            ));
        }

        if !(0.0..1.0).contains(&self.ingest.reserved_fraction) {
            return Err(WarcdexError::ConfigError(
                "Reserved fraction must be in [0, 1)".to_string(),
            ));
        }

        if self.ingest.progress_interval == 0 {
            return Err(WarcdexError::ConfigError(
                "Progress interval must be non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Corpus root: {:?}", self.corpus.root);
        tracing::info!("  Subset pattern: {}", self.corpus.subset_pattern);
        tracing::info!("  File pattern: {}", self.corpus.file_pattern);
        tracing::info!("  Archive version: {}", self.corpus.version);
        tracing::info!("  Shuffle: {}", self.corpus.shuffle);
        tracing::info!("  Index: {}", self.index.name);
        tracing::info!("  Index storage: {:?}", self.index.storage_dir);
        tracing::info!("  Batch bytes: {}", self.index.batch_bytes);
        tracing::info!("  Max document bytes: {}", self.index.max_document_bytes);
        tracing::info!("  Progress file: {:?}", self.ingest.progress_file);
        tracing::info!("  Skip file: {:?}", self.ingest.skip_file);
        tracing::info!("  Workers: {}", self.ingest.worker_count());
    }
}
