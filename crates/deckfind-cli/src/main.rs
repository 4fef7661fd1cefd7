//! Deckfind CLI
//!
//! Search and manage a pitch-deck vector index.

use anyhow::Result;
use clap::Parser;
use deckfind_core::{Config, DeckFindError};

mod app;
mod commands;
mod output;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let default_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(default_level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<DeckFindError>()
            .map(DeckFindError::exit_code)
            .unwrap_or(deckfind_core::error::exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Search(args) => commands::search::run(args, &config, cli.format).await,
        Commands::Ingest(args) => commands::ingest::run(args, &config).await,
        Commands::Stats => commands::stats::run(&config, cli.format).await,
        Commands::Vocab(args) => commands::vocab::run(args).await,
    }
}
