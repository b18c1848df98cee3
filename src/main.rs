//! rustharvest - Scholarly record harvester
//!
//! Harvests Google Scholar listings through SerpApi, normalizes and
//! deduplicates them, and exports or stores the filtered set.
//!
//! ## Usage
//!
//! ### CLI Mode
//! ```bash
//! rustharvest search --author "Geoffrey Hinton" --start 2015-01-01
//! rustharvest export --title "graph neural networks" -o ./output
//! ```
//!
//! ### HTTP Server Mode
//! ```bash
//! rustharvest serve --port 3000
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rustharvest::{
    config::{DEFAULT_BASE_URL, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS},
    export,
    filter::{self, DateRange, DEFAULT_PER_PAGE},
    server::{self, AppState},
    service::{collect_export, collect_listing, export_term, has_term},
    store::RecordStore,
    HarvestOptions, Harvester, ProviderConfig, SerpApiClient,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Scholarly record harvester - SerpApi Google Scholar
#[derive(Parser)]
#[command(name = "rustharvest")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ProviderArgs {
    /// SerpApi key
    #[arg(long, env = "SERPAPI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// SerpApi base URL
    #[arg(long, env = "SERPAPI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Maximum provider pages per query
    #[arg(long, default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: u32,

    /// Results requested per provider page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,
}

impl ProviderArgs {
    fn harvester(&self) -> Result<Harvester<SerpApiClient>> {
        let config = ProviderConfig::new(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs));
        let client = SerpApiClient::new(config).context("Invalid provider configuration")?;
        Ok(Harvester::new(client))
    }

    fn options(&self) -> HarvestOptions {
        HarvestOptions {
            max_pages: self.max_pages,
            page_size: self.page_size,
        }
    }
}

#[derive(Args, Clone)]
struct QueryArgs {
    /// Author name to search for
    #[arg(long)]
    author: Option<String>,

    /// Title to search for
    #[arg(long)]
    title: Option<String>,

    /// Earliest publication date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Latest publication date (YYYY-MM-DD, inclusive)
    #[arg(long)]
    end: Option<NaiveDate>,
}

impl QueryArgs {
    fn range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Harvest and print one display page of results
    Search {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        provider: ProviderArgs,

        /// Display page (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Records per display page
        #[arg(long, default_value_t = DEFAULT_PER_PAGE)]
        per_page: usize,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Harvest by title and author, deduplicate, and write CSV
    Export {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        provider: ProviderArgs,

        /// Output directory
        #[arg(short, long, default_value = "./output")]
        output: PathBuf,
    },

    /// Harvest and add new records to the library
    Save {
        #[command(flatten)]
        query: QueryArgs,

        #[command(flatten)]
        provider: ProviderArgs,

        /// Library file (default: ~/.rustharvest_library.json)
        #[arg(long)]
        store: Option<PathBuf>,
    },

    /// Manage the saved record library
    Library {
        #[command(subcommand)]
        action: LibraryAction,

        /// Library file (default: ~/.rustharvest_library.json)
        #[arg(long, global = true)]
        store: Option<PathBuf>,
    },

    /// Run as HTTP server
    Serve {
        #[command(flatten)]
        provider: ProviderArgs,

        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Library file (default: ~/.rustharvest_library.json)
        #[arg(long)]
        store: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum LibraryAction {
    /// List saved records
    List,
    /// Show library file path
    Path,
    /// Delete all saved records
    Clear,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false);

    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Search {
            query,
            provider,
            page,
            per_page,
            json,
        } => run_search(query, provider, page, per_page, json).await,
        Commands::Export {
            query,
            provider,
            output,
        } => run_export(query, provider, output).await,
        Commands::Save {
            query,
            provider,
            store,
        } => run_save(query, provider, open_store(store)?).await,
        Commands::Library { action, store } => handle_library(action, open_store(store)?),
        Commands::Serve {
            provider,
            port,
            host,
            store,
        } => run_server(host, port, provider, open_store(store)?).await,
    }
}

fn open_store(path: Option<PathBuf>) -> Result<RecordStore> {
    match path {
        Some(path) => Ok(RecordStore::with_path(path)),
        None => RecordStore::new().context("Failed to resolve library path"),
    }
}

// ============================================================================
// Harvest Flows
// ============================================================================

async fn run_search(
    query: QueryArgs,
    provider: ProviderArgs,
    page: usize,
    per_page: usize,
    json: bool,
) -> Result<()> {
    if !has_term(query.author.as_deref(), query.title.as_deref()) {
        anyhow::bail!("Provide --author or --title");
    }

    let harvester = provider.harvester()?;
    let records = collect_listing(
        &harvester,
        query.author.as_deref(),
        query.title.as_deref(),
        &query.range(),
        &provider.options(),
    )
    .await
    .context("Harvest failed")?;

    let view = filter::paginate(&records, page, per_page);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!(
        "Page {} of {} ({} records)",
        view.current_page, view.total_pages, view.total_items
    );
    for (i, record) in view.results.iter().enumerate() {
        println!("\n{}. {}", view.offset + i + 1, record.title);
        println!("   {}", record.author_names);
        if let Some(date) = record.publication_date {
            println!("   {}", date.format("%Y"));
        }
        if let Some(url) = &record.source_url {
            println!("   {}", url);
        }
    }
    Ok(())
}

async fn run_export(query: QueryArgs, provider: ProviderArgs, output: PathBuf) -> Result<()> {
    let harvester = provider.harvester()?;

    info!(
        author = ?query.author,
        title = ?query.title,
        start = ?query.start,
        end = ?query.end,
        "Exporting CSV"
    );

    let records = collect_export(
        &harvester,
        query.author.as_deref(),
        query.title.as_deref(),
        &query.range(),
        &provider.options(),
    )
    .await
    .context("Harvest failed")?;

    let term = export_term(query.author.as_deref(), query.title.as_deref());
    let path = export::save_csv(&output, term, &records).context("Failed to write CSV")?;

    println!("Exported {} records to {}", records.len(), path.display());
    Ok(())
}

async fn run_save(query: QueryArgs, provider: ProviderArgs, store: RecordStore) -> Result<()> {
    let harvester = provider.harvester()?;

    let records = collect_export(
        &harvester,
        query.author.as_deref(),
        query.title.as_deref(),
        &query.range(),
        &provider.options(),
    )
    .await
    .context("Harvest failed")?;

    if records.is_empty() {
        println!("No records to save.");
        return Ok(());
    }

    let summary = store.save(&records).context("Failed to save records")?;
    println!(
        "Saved {} new records ({} duplicates skipped) to {}",
        summary.saved,
        summary.skipped,
        store.path().display()
    );
    Ok(())
}

// ============================================================================
// Library Management
// ============================================================================

fn handle_library(action: LibraryAction, store: RecordStore) -> Result<()> {
    match action {
        LibraryAction::List => {
            let records = store.load();
            println!("{} saved records", records.len());
            for record in &records {
                let year = record
                    .publication_date
                    .map(|d| d.format("%Y").to_string())
                    .unwrap_or_else(|| "----".to_string());
                println!("  [{}] {} - {}", year, record.title, record.author_names);
            }
        }
        LibraryAction::Path => {
            println!("Library file: {:?}", store.path());
        }
        LibraryAction::Clear => {
            store.clear()?;
            println!("Library cleared.");
        }
    }
    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(host: String, port: u16, provider: ProviderArgs, store: RecordStore) -> Result<()> {
    info!(host = %host, port = port, "Starting HTTP server");

    let app_state = Arc::new(AppState::new(provider.harvester()?, provider.options(), store));
    let app = server::router(app_state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
