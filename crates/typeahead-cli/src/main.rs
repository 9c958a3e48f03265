//! Typeahead CLI - drive the search popover from scripted keystrokes

mod cli;
mod script;
mod session;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;
use typeahead_core::{PageRequest, SearchConfig, SearchOptions, SearchRequest, ShareId};
use typeahead_popover::SearchPopover;
use typeahead_search::{Corpus, MemoryBackend, SearchBackend};

use crate::cli::{Cli, Commands, CorpusArgs, SearchArgs, SessionArgs};
use crate::script::parse_script;
use crate::session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the session transcript
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("typeahead=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Session(args) => run_session(args).await,
        Commands::Search(args) => run_search(args).await,
    }
}

/// Load the corpus and resolve which share to search
async fn open_backend(args: &CorpusArgs) -> Result<(MemoryBackend, ShareId)> {
    let corpus = Corpus::load(&args.corpus)
        .await
        .with_context(|| format!("Failed to load corpus {}", args.corpus.display()))?;

    let share_id = match &args.share {
        Some(share) => ShareId::parse(share).context("Invalid --share")?,
        None => corpus.share_id,
    };

    let backend =
        MemoryBackend::from_corpus(corpus).with_latency(Duration::from_millis(args.latency_ms));
    Ok((backend, share_id))
}

async fn run_session(args: SessionArgs) -> Result<()> {
    let mut config = SearchConfig::from_env()?;
    if let Some(ms) = args.debounce_ms {
        config = config.with_debounce_ms(ms);
    }
    if let Some(size) = args.page_size {
        config = config.with_page_size(size);
    }
    config.validate()?;

    let script = match &args.script {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read script {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        }
    };
    let steps = parse_script(&script)?;

    let (backend, share_id) = open_backend(&args.corpus).await?;
    info!(
        "Starting session on share {} ({} steps, debounce {}ms, page size {})",
        share_id,
        steps.len(),
        config.debounce_ms,
        config.page_size
    );

    let popover =
        SearchPopover::with_backend(Arc::new(backend), SearchOptions::new(share_id), config);
    let mut session = Session::new(popover, std::io::stdout());
    session.run(steps).await
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let (backend, share_id) = open_backend(&args.corpus).await?;
    let request = SearchRequest::new(
        args.query.join(" "),
        SearchOptions::new(share_id),
        PageRequest {
            offset: args.offset,
            limit: args.limit,
        },
        0,
    );

    let entries = backend.search(&request).await?;
    if entries.is_empty() {
        println!("No results for {}", request.query);
        return Ok(());
    }

    for (index, entry) in entries.iter().enumerate() {
        println!(
            "{:>3}. {} ({})",
            args.offset + index,
            entry.document.title,
            entry.document.id
        );
        if !entry.context.is_empty() {
            println!("     {}", entry.context);
        }
    }
    Ok(())
}
