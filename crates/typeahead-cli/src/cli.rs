//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "typeahead", version, about = "Drive the typeahead search control from a script")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay keystrokes against a corpus (reads stdin without --script)
    Session(SessionArgs),

    /// Run a single search against a corpus, without debouncing
    Search(SearchArgs),
}

#[derive(Args, Debug)]
pub struct CorpusArgs {
    /// JSON corpus file
    #[arg(long)]
    pub corpus: PathBuf,

    /// Share to search in (defaults to the corpus share)
    #[arg(long)]
    pub share: Option<String>,

    /// Simulated backend latency in milliseconds
    #[arg(long, default_value_t = 0)]
    pub latency_ms: u64,
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    /// Script file, one event per line
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Debounce window in milliseconds (overrides TYPEAHEAD_DEBOUNCE_MS)
    #[arg(long)]
    pub debounce_ms: Option<u64>,

    /// Results per page (overrides TYPEAHEAD_PAGE_SIZE)
    #[arg(long)]
    pub page_size: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    #[command(flatten)]
    pub corpus: CorpusArgs,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,

    #[arg(long, default_value_t = 25)]
    pub limit: usize,

    /// Query terms
    #[arg(required = true)]
    pub query: Vec<String>,
}
