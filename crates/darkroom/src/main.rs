//! Darkroom CLI - photo ingestion from the command line.
//!
//! Darkroom validates uploaded photos, extracts their EXIF metadata, renders a
//! thumbnail and stores both under collision-free keys. The CLI drives the
//! same pipeline an upload endpoint would.
//!
//! # Usage
//!
//! ```bash
//! # Ingest a single photo into an album
//! darkroom ingest holiday.jpg --album 3fa85f64
//!
//! # Ingest a directory, writing one JSON line per photo
//! darkroom ingest ./photos/ --album 3fa85f64 --format jsonl --output results.jsonl
//!
//! # Remove a stored photo and its thumbnail
//! darkroom delete 20240601_123456_a1b2c3d4_holiday.jpg thumb_20240601_123456_a1b2c3d4_holiday.jpg
//!
//! # View configuration
//! darkroom config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;

/// Darkroom - validate, describe, thumbnail and store uploaded photos.
#[derive(Parser, Debug)]
#[command(name = "darkroom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the platform default
    #[arg(long, global = true, env = "DARKROOM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Ingest photos: validate, extract metadata, thumbnail and store
    Ingest(cli::ingest::IngestArgs),

    /// Delete a stored photo and its thumbnail
    Delete(cli::delete::DeleteArgs),

    /// Print the public URL for a storage key
    Url(cli::url::UrlArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so config warnings go through eprintln.
    let loaded = match &cli.config {
        Some(path) => darkroom_core::Config::load_from(path),
        None => darkroom_core::Config::load(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `darkroom config path`."
            );
            darkroom_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Darkroom v{}", darkroom_core::VERSION);

    match cli.command {
        Commands::Ingest(args) => cli::ingest::execute(args, config).await,
        Commands::Delete(args) => cli::delete::execute(args, &config).await,
        Commands::Url(args) => cli::url::execute(args, &config),
        Commands::Config(args) => cli::config::execute(args, &config, cli.config.as_deref()).await,
    }
}
