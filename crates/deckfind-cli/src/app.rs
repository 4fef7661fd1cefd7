//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deckfind")]
#[command(
    author,
    version,
    about = "Cascading retrieval over a pitch-deck vector index"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Config file path (defaults to the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search the index
    Search(SearchArgs),

    /// Ingest extracted deck metadata JSON into the index
    Ingest(IngestArgs),

    /// Show index statistics
    Stats,

    /// Build a vocabulary snapshot from a document corpus
    Vocab(VocabArgs),
}

#[derive(Args)]
pub struct SearchArgs {
    /// Query text
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Retrieval mode
    #[arg(long, value_enum, default_value = "cascade")]
    pub mode: SearchModeArg,

    /// Filter by industry (exact match)
    #[arg(long)]
    pub industry: Option<String>,

    /// Filter by company (exact match)
    #[arg(long)]
    pub company: Option<String>,

    /// Filter by keyword tag (repeatable, matches any)
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,

    /// Earliest creation year (inclusive)
    #[arg(long)]
    pub year_from: Option<i64>,

    /// Latest creation year (inclusive)
    #[arg(long)]
    pub year_to: Option<i64>,

    /// Number of results to return
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Skip LLM query enhancement (embeds the raw query, no keyword boost)
    #[arg(long)]
    pub no_enhance: bool,
}

#[derive(Args)]
pub struct IngestArgs {
    /// Metadata JSON file or a directory of *_metadata.json files
    pub path: PathBuf,
}

#[derive(Args)]
pub struct VocabArgs {
    /// Directory of *_metadata.json files to derive the vocabulary from
    pub path: PathBuf,

    /// Output snapshot path
    #[arg(short, long, default_value = "vocabulary.json")]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SearchModeArg {
    Slides,
    Decks,
    Cascade,
}

impl From<SearchModeArg> for deckfind_core::SearchMode {
    fn from(mode: SearchModeArg) -> Self {
        match mode {
            SearchModeArg::Slides => deckfind_core::SearchMode::Slides,
            SearchModeArg::Decks => deckfind_core::SearchMode::Decks,
            SearchModeArg::Cascade => deckfind_core::SearchMode::Cascade,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output
    Cli,

    /// JSON for downstream tooling
    Json,
}
