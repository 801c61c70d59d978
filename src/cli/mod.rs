//! CLI adapter for warcdex
//!
//! Command-line surface over the ingestion pipeline. Depends on `core/`,
//! never the reverse.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |     core/        |
//! |  (domain logic)  |
//! +--------+---------+
//!          |
//!          v
//! +------------------+
//! |      cli/        |
//! | (clap adapter)   |
//! +------------------+
//! ```

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

/// warcdex - ClueWeb12 WARC ingestion
///
/// Decodes gzip-compressed WARC archives, reduces every HTML response to
/// a title and body, and loads the documents into a full-text index.
/// Interrupted runs resume from the progress ledger.
#[derive(Parser, Debug)]
#[command(name = "warcdex")]
#[command(version)]
#[command(about = "Resumable WARC ingestion into a full-text index", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log filter used when `RUST_LOG` is unset
    ///
    /// `ingest --quiet` keeps warnings and errors only.
    pub fn default_log_filter(&self) -> &'static str {
        match &self.command {
            Commands::Ingest(args) if args.quiet => "warcdex=warn",
            _ => "warcdex=info",
        }
    }
}

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output for scripting
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest a corpus into the index, resuming from the progress ledger
    Ingest(commands::IngestArgs),

    /// Extract the documents of one archive without indexing them
    #[command(name = "extract-file")]
    ExtractFile(commands::ExtractArgs),

    /// Show progress ledger, skip report and index status
    Status(commands::StatusArgs),

    /// Show current configuration
    #[command(name = "show-config")]
    ShowConfig(commands::ConfigArgs),

    /// Generate shell completion scripts
    ///
    /// Output completion script to stdout. To install:
    ///
    ///   bash:  warcdex completions bash > ~/.local/share/bash-completion/completions/warcdex
    ///   zsh:   warcdex completions zsh > ~/.zfunc/_warcdex
    ///   fish:  warcdex completions fish > ~/.config/fish/completions/warcdex.fish
    Completions(commands::CompletionsArgs),
}

/// Run the CLI with the provided arguments
pub async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    use crate::core::config::Config;
    use crate::core::services::Services;
    use crate::core::xdg::XdgDirs;
    use std::sync::Arc;

    // Handle completions command early (doesn't need services)
    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let xdg = XdgDirs::new();
    xdg.ensure_dirs_exist()?;

    let config = Config::load_with_xdg(&xdg)?;
    let services = Arc::new(Services::new(config));

    match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(args, &services, cli.format).await,
        Commands::ExtractFile(args) => {
            commands::extract::execute(args, &services, cli.format).await
        }
        Commands::Status(args) => commands::status::execute(args, &services, cli.format).await,
        Commands::ShowConfig(args) => commands::config::execute(args, &services, cli.format).await,
        Commands::Completions(_) => unreachable!(), // Handled above
    }
}
