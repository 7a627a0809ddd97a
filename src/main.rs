//! Crawl-Ledger main entry point
//!
//! This is the command-line interface for inspecting and maintaining the
//! crawl record database.

use anyhow::Context;
use clap::{Parser, Subcommand};
use crawl_ledger::config::{load_config_with_hash, Config};
use crawl_ledger::metrics::list_live_links;
use crawl_ledger::record::CrawlRecord;
use crawl_ledger::storage::{RecordDb, SqliteStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Crawl-Ledger: the per-URL crawl-state record database
///
/// Crawl-Ledger keeps one record per discovered URL: fetch scheduling state,
/// content, links, timestamps and derived signals, shared by the stages of a
/// crawling pipeline.
#[derive(Parser, Debug)]
#[command(name = "crawl-ledger")]
#[command(version = "1.0.0")]
#[command(about = "Per-URL crawl record database", long_about = None)]
struct Cli {
    /// Path to TOML configuration file; defaults apply when omitted
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create unfetched seed records for the given URLs
    Seed {
        /// URLs to seed
        #[arg(required = true, value_name = "URL")]
        urls: Vec<String>,
    },

    /// Show the stored record for a URL
    Get {
        #[arg(value_name = "URL")]
        url: String,
    },

    /// List the live links collected on the metrics home record
    Links {
        /// Maximum number of entries; the configured default applies when omitted
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Delete the stored record for a URL
    Delete {
        #[arg(value_name = "URL")]
        url: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration: {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    let db = RecordDb::new(
        SqliteStore::open(&config.storage.database_path)
            .with_context(|| format!("failed to open database: {}", config.storage.database_path))?,
    );

    match cli.command {
        Command::Seed { urls } => handle_seed(&db, &urls),
        Command::Get { url } => handle_get(&db, &url),
        Command::Links { limit } => handle_links(&db, &config, limit),
        Command::Delete { url } => handle_delete(&db, &url),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawl_ledger=info,warn"),
            1 => EnvFilter::new("crawl_ledger=debug,info"),
            2 => EnvFilter::new("crawl_ledger=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the seed subcommand: creates unfetched records marked as seeds
fn handle_seed(db: &RecordDb<SqliteStore>, urls: &[String]) -> anyhow::Result<()> {
    let mut seeded = 0;
    for url in urls {
        let mut record = CrawlRecord::new(url.clone(), db.sequencer());
        if !record.is_persistable() {
            tracing::warn!(url, "skipping URL that cannot be keyed");
            continue;
        }
        record.mark_seed();
        record.set_distance(0);
        db.put_record(&record)
            .with_context(|| format!("failed to store seed record: {}", url))?;
        seeded += 1;
    }

    println!("✓ Seeded {} of {} URLs", seeded, urls.len());
    Ok(())
}

/// Handles the get subcommand: prints the stored record, if any
fn handle_get(db: &RecordDb<SqliteStore>, url: &str) -> anyhow::Result<()> {
    match db.get_record(url)? {
        Some(record) => {
            println!("url:          {}", record.url());
            println!("key:          {}", record.key());
            println!("location:     {}", record.location());
            println!("status:       {}", record.crawl_status());
            println!("distance:     {}", record.distance());
            println!("fetch count:  {}", record.fetch_count());
            println!("fetch time:   {}", record.fetch_time());
            println!("create time:  {}", record.create_time());
            println!("title:        {}", record.page_title());
            println!("content type: {}", record.content_type());
            println!("signature:    {}", record.signature_as_string());
            println!("links:        {}", record.links().len());
            println!("live links:   {}", record.live_links().len());
            println!("seed:         {}", record.is_seed());
        }
        None => println!("no record for {}", url),
    }
    Ok(())
}

/// Handles the links subcommand: renders the metrics link listing
fn handle_links(
    db: &RecordDb<SqliteStore>,
    config: &Config,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let limit = limit.unwrap_or(config.metrics.default_limit);
    let listing = list_live_links(db, &config.metrics.home_url, limit)?;
    println!("{}", listing);
    Ok(())
}

/// Handles the delete subcommand
fn handle_delete(db: &RecordDb<SqliteStore>, url: &str) -> anyhow::Result<()> {
    if db.delete_record(url)? {
        println!("✓ Deleted record for {}", url);
    } else {
        println!("no record for {}", url);
    }
    Ok(())
}
