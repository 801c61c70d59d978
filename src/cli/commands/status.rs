//! Status command - progress ledger, skip report and index state

use crate::cli::output::{colors, format_age};
use crate::cli::OutputFormat;
use crate::core::ingest::{ProgressLedger, SkipReport};
use crate::core::services::Services;
use crate::core::storage::IndexBackend;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Index to report on (defaults to `index.name`)
    #[arg(long)]
    pub index: Option<String>,
}

/// Index section of the status response
#[derive(Debug, Serialize)]
pub struct IndexStatus {
    pub name: String,
    pub exists: bool,
    pub documents: Option<u64>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Status response
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub progress_file: String,
    pub files_completed: Option<usize>,
    pub skip_file: String,
    pub skipped_documents: usize,
    pub index: IndexStatus,
    /// Every index under the storage root
    pub all_indexes: Vec<String>,
}

/// Execute the status command
pub async fn execute(
    args: StatusArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;
    let name = args.index.unwrap_or_else(|| config.index.name.clone());

    let files_completed = if config.ingest.progress_file.exists() {
        Some(ProgressLedger::open(&config.ingest.progress_file)?.len())
    } else {
        None
    };

    let index = if services.backend.index_exists(&name) {
        let metadata = services.backend.metadata(&name)?;
        IndexStatus {
            documents: Some(services.backend.document_count(&name)?),
            created_at: Some(metadata.created_at),
            exists: true,
            name,
        }
    } else {
        IndexStatus {
            name,
            exists: false,
            documents: None,
            created_at: None,
        }
    };

    let response = StatusResponse {
        progress_file: config.ingest.progress_file.to_string_lossy().into_owned(),
        files_completed,
        skip_file: config.ingest.skip_file.to_string_lossy().into_owned(),
        skipped_documents: SkipReport::count_in(&config.ingest.skip_file)?,
        index,
        all_indexes: services
            .backend
            .list_indexes()?
            .into_iter()
            .map(|m| m.name)
            .collect(),
    };

    match format {
        OutputFormat::Human => {
            println!("{}", colors::label("Progress:"));
            println!("  ledger: {}", colors::file_path(&response.progress_file));
            match response.files_completed {
                Some(n) => println!("  files completed: {}", colors::number(&n.to_string())),
                None => println!("  files completed: {}", colors::dim("no ledger yet")),
            }
            println!("  skip report: {}", colors::file_path(&response.skip_file));
            println!(
                "  skipped documents (last run): {}",
                colors::number(&response.skipped_documents.to_string())
            );

            println!("{}", colors::label("Index:"));
            println!("  name: {}", colors::name(&response.index.name));
            match (response.index.documents, response.index.created_at) {
                (Some(docs), Some(created)) => {
                    println!("  documents: {}", colors::number(&docs.to_string()));
                    println!("  created: {}", format_age(&created));
                }
                _ => println!("  {}", colors::dim("not created yet")),
            }
            if !response.all_indexes.is_empty() {
                println!("  all indexes: {}", response.all_indexes.join(", "));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
