//! warcdex CLI - ingest ClueWeb12 WARC archives into a full-text index
//!
//! # Examples
//!
//! ```bash
//! # Ingest a corpus (resumes automatically)
//! warcdex ingest /data/ClueWeb12 --index clueweb12
//!
//! # Only the first segment, starting over
//! warcdex ingest /data/ClueWeb12 --subset ClueWeb12_00 --reset-progress
//!
//! # Inspect one archive
//! warcdex extract-file /data/ClueWeb12/ClueWeb12_00/0000tw/0000tw-00.warc.gz
//!
//! # Progress and index state
//! warcdex status
//! ```

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use warcdex::cli::{run, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json, cli.default_log_filter());

    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool, default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
