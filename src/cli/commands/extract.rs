//! Extract-file command - run the extraction stage on one archive
//!
//! Nothing is indexed and the progress ledger is left alone.

use crate::cli::output::{colors, truncate_chars};
use crate::cli::OutputFormat;
use crate::core::ingest::FileExtractor;
use crate::core::services::Services;
use crate::core::types::{ExtractedDocument, ExtractionStats};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the extract-file command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Gzip-compressed archive to extract
    pub file: PathBuf,

    /// Show at most this many documents (0 = all)
    #[arg(long, short = 'n', default_value = "10")]
    pub limit: usize,

    /// Characters of body text shown per document in human output
    #[arg(long, default_value = "200")]
    pub body_chars: usize,

    /// Archive format version (defaults to `corpus.version`)
    #[arg(long)]
    pub warc_version: Option<String>,
}

/// Extraction result response
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub file: String,
    pub stats: ExtractionStats,
    pub documents: Vec<ExtractedDocument>,
}

/// Execute the extract-file command
pub async fn execute(
    args: ExtractArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if !args.file.is_file() {
        return Err(format!("Archive '{}' does not exist.", args.file.display()).into());
    }

    let version = args
        .warc_version
        .clone()
        .unwrap_or_else(|| services.config.corpus.version.clone());
    let path = args.file.clone();
    let limit = args.limit;

    let (documents, stats) = tokio::task::spawn_blocking(move || {
        let extractor = FileExtractor::new(version);
        let extraction = extractor.open(&path)?;
        let mut stream = extraction.documents();

        let mut documents = Vec::new();
        for doc in stream.by_ref() {
            if limit == 0 || documents.len() < limit {
                documents.push(doc);
            }
        }
        crate::core::Result::Ok((documents, stream.stats()))
    })
    .await??;

    let response = ExtractResponse {
        file: args.file.to_string_lossy().into_owned(),
        stats,
        documents,
    };

    match format {
        OutputFormat::Human => {
            for doc in &response.documents {
                println!("{}", colors::name(&doc.id));
                println!("  {} {}", colors::label("url:"), colors::file_path(&doc.url));
                println!("  {} {}", colors::label("domain:"), doc.domain);
                println!("  {} {}", colors::label("title:"), doc.title);
                println!(
                    "  {} {}",
                    colors::label("body:"),
                    colors::dim(&truncate_chars(&doc.body, args.body_chars))
                );
                println!();
            }
            println!(
                "{} records, {} documents, {} dropped, {} empty",
                colors::number(&response.stats.records_seen.to_string()),
                colors::number(&response.stats.documents_emitted.to_string()),
                colors::number(&response.stats.records_dropped.to_string()),
                colors::number(&response.stats.empty_documents.to_string())
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
