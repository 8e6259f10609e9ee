//! votecache - cached lookups of European Parliament roll-call votes.
//!
//! Fetches detailed votes from HowTheyVote.eu and keeps them in a compact
//! on-disk cache, so repeated lookups never hit the network.

mod api;
mod config;
mod format;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use votecache_core::{
    CachedVotes, FileStore, KvStore, Origin, Vote, VoteCacheManager, VoteId,
};

use api::ApiClient;
use config::Config;
use format::{format_age, format_bytes, format_counts, truncate_string};

// ============================================================================
// Constants
// ============================================================================

/// Log file written next to the cache documents
const LOG_FILE: &str = "votecache.log";

/// Maximum title width in vote summaries
const TITLE_WIDTH: usize = 72;

const USAGE: &str = "\
Usage: votecache <command>

Commands:
  vote <id>...   Show votes, reading through the local cache
  stats          Show cache size and contents
  purge          Remove expired votes from the cache
  clear          Remove everything from the cache
  --help         Show this message

Environment:
  RUST_LOG            Log filter (default: warn)
  VOTECACHE_API_URL   Override the API base URL";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Votes(Vec<VoteId>),
    Stats,
    Purge,
    Clear,
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(command) = args.first() else {
        return Ok(Command::Help);
    };
    let rest = &args[1..];

    match command.as_str() {
        "vote" | "votes" => {
            if rest.is_empty() {
                bail!("`vote` needs at least one vote id");
            }
            if let Some(bad) = rest.iter().find(|id| id.trim().is_empty()) {
                bail!("Invalid vote id: {:?}", bad);
            }
            Ok(Command::Votes(rest.iter().map(|id| VoteId::from(id.trim())).collect()))
        }
        "stats" | "purge" | "clear" if !rest.is_empty() => {
            bail!("`{}` takes no arguments", command)
        }
        "stats" => Ok(Command::Stats),
        "purge" => Ok(Command::Purge),
        "clear" => Ok(Command::Clear),
        "-h" | "--help" | "help" => Ok(Command::Help),
        other => bail!("Unknown command: {}", other),
    }
}

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr and, when the directory is writable, to a file in
/// `log_dir`. The returned guard flushes the file writer on drop.
fn init_tracing(log_dir: &Path) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::fs::create_dir_all(log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn open_cache(config: &Config) -> Result<Arc<VoteCacheManager>> {
    let dir = config.cache_dir()?;
    let store: Arc<dyn KvStore> = match config.quota_bytes {
        Some(quota) => Arc::new(FileStore::with_quota(dir, quota)?),
        None => Arc::new(FileStore::new(dir)?),
    };
    Ok(Arc::new(VoteCacheManager::new(store)))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };
    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load()?;
    let _log_guard = init_tracing(&config.cache_dir()?);
    info!(api = %config.api_base_url, "votecache starting");

    let cache = open_cache(&config)?;
    match command {
        Command::Votes(ids) => {
            let failed = show_votes(&config, cache, ids).await?;
            if failed > 0 {
                std::process::exit(1);
            }
        }
        Command::Stats => show_stats(&cache)?,
        Command::Purge => {
            let purged = cache.purge_expired().await?;
            println!("Purged {} expired vote(s)", purged);
        }
        Command::Clear => {
            cache.clear().await?;
            println!("Cache cleared");
        }
        Command::Help => {}
    }
    Ok(())
}

/// Looks up every id with bounded concurrency and prints a summary per
/// vote. Returns how many lookups failed.
async fn show_votes(config: &Config, cache: Arc<VoteCacheManager>, ids: Vec<VoteId>) -> Result<usize> {
    let client = ApiClient::new(config.api_base_url.clone())?;
    let votes = CachedVotes::new(client, cache);

    let mut results: Vec<_> = stream::iter(ids.into_iter().enumerate())
        .map(|(index, id)| {
            let votes = &votes;
            async move {
                let result = votes.get_vote(&id).await;
                (index, id, result)
            }
        })
        .buffer_unordered(config.concurrency())
        .collect()
        .await;
    results.sort_by_key(|(index, _, _)| *index);

    let mut failed = 0;
    for (_, id, result) in results {
        match result {
            Ok((vote, origin)) => print_vote(&vote, origin),
            Err(e) => {
                failed += 1;
                warn!(vote_id = %id, error = %e, "Lookup failed");
                eprintln!("{}: {:#}", id, e);
            }
        }
    }

    // Let the background cache writes land before the runtime shuts down.
    votes.flush().await;
    Ok(failed)
}

fn print_vote(vote: &Vote, origin: Origin) {
    let origin = match origin {
        Origin::Cache => "cached",
        Origin::Network => "fetched",
    };
    println!(
        "{}  {}  [{}]",
        vote.id(),
        truncate_string(vote.title(), TITLE_WIDTH),
        origin
    );
    println!(
        "    {}  {} members  {}",
        vote.details.timestamp,
        vote.member_votes.len(),
        format_counts(&vote.position_counts())
    );
}

fn show_stats(cache: &VoteCacheManager) -> Result<()> {
    let stats = cache.stats()?;
    println!("Votes:    {}", stats.votes);
    println!("Members:  {}", stats.members);
    println!(
        "Size:     {} (votes {}, members {})",
        format_bytes(stats.total_bytes()),
        format_bytes(stats.vote_bytes),
        format_bytes(stats.member_bytes)
    );
    if let Some(oldest) = stats.oldest_vote {
        println!("Oldest:   {}", format_age(oldest, Utc::now()));
    }
    Ok(())
}
