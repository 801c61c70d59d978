//! Config command - show current configuration

use crate::cli::output::format_bytes;
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also show the resolved XDG directories
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Resolved XDG directories
#[derive(Debug, Serialize)]
pub struct DirsResponse {
    pub config_dir: String,
    pub data_dir: String,
    pub state_dir: String,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    #[serde(flatten)]
    pub config: Config,
    pub workers_effective: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dirs: Option<DirsResponse>,
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = services.config.as_ref().clone();

    let dirs = args.all.then(|| {
        let xdg = crate::core::xdg::XdgDirs::new();
        DirsResponse {
            config_dir: xdg.config_dir.to_string_lossy().into_owned(),
            data_dir: xdg.data_dir.to_string_lossy().into_owned(),
            state_dir: xdg.state_dir.to_string_lossy().into_owned(),
        }
    });

    let response = ConfigResponse {
        workers_effective: config.ingest.worker_count(),
        config,
        dirs,
    };

    match format {
        OutputFormat::Human => {
            let c = &response.config;
            println!("Configuration:");
            println!("  corpus:");
            println!("    root: {}", c.corpus.root.display());
            println!("    subset_pattern: {}", c.corpus.subset_pattern);
            println!("    file_pattern: {}", c.corpus.file_pattern);
            println!("    version: {}", c.corpus.version);
            println!("    shuffle: {}", c.corpus.shuffle);
            println!("  index:");
            println!("    name: {}", c.index.name);
            println!("    storage_dir: {}", c.index.storage_dir.display());
            println!("    batch_bytes: {}", format_bytes(c.index.batch_bytes as u64));
            println!(
                "    max_document_bytes: {}",
                format_bytes(c.index.max_document_bytes as u64)
            );
            println!("    writer_heap_mb: {}", c.index.writer_heap_mb);
            println!("    allow_overwrite: {}", c.index.allow_overwrite);
            println!("  ingest:");
            println!("    progress_file: {}", c.ingest.progress_file.display());
            println!("    skip_file: {}", c.ingest.skip_file.display());
            println!("    workers: {}", response.workers_effective);
            println!("    progress_interval: {}", c.ingest.progress_interval);
            if let Some(dirs) = &response.dirs {
                println!("  dirs:");
                println!("    config: {}", dirs.config_dir);
                println!("    data: {}", dirs.data_dir);
                println!("    state: {}", dirs.state_dir);
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
