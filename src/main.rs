//! Link-Census main entry point
//!
//! This is the command-line interface that runs the link census HTTP API.

use anyhow::Context;
use clap::Parser;
use link_census::api;
use link_census::config::{load_config_with_hash, validate, Config};
use link_census::scrape::{header_modifier, PageScraper, RequestModifier, Scraper};
use link_census::{InMemoryJobStore, LinkJobService};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Link-Census: counts internal and external links per page
///
/// Serves an HTTP API that accepts batches of URLs as jobs, scrapes every
/// page concurrently and reports how many of each page's links stay on its
/// own host.
#[derive(Parser, Debug)]
#[command(name = "link-census")]
#[command(version = "1.0.0")]
#[command(about = "Counts internal and external links across batches of pages", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Address to listen on, overriding the config file
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Workers per scrape, overriding the config file
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Validate config and print the resolved settings without serving
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_serve(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_census=info,warn"),
            1 => EnvFilter::new("link_census=debug,info"),
            2 => EnvFilter::new("link_census=trace,debug"),
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

/// Loads the config file if one was given and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(bind) = &cli.bind {
        config.server.bind_address = bind.clone();
    }
    if let Some(concurrency) = cli.concurrency {
        config.scraper.concurrency = concurrency;
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: prints the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Link-Census Dry Run ===\n");

    println!("Server:");
    println!("  Bind address: {}", config.server.bind_address);
    println!("  Shutdown timeout: {}s", config.server.shutdown_timeout);

    println!("\nScraper:");
    println!("  Concurrency: {}", config.scraper.concurrency);
    println!("  User agent: {}", config.scraper.user_agent);
    println!("  Request timeout: {}s", config.scraper.request_timeout);
    println!("  Connect timeout: {}s", config.scraper.connect_timeout);

    println!("\nExtra Headers ({}):", config.scraper.headers.len());
    for (name, value) in &config.scraper.headers {
        println!("  - {}: {}", name, value);
    }

    println!("\n✓ Configuration is valid");
}

/// Runs the API until a shutdown signal, then drains in-flight scrapes
async fn handle_serve(config: Config) -> anyhow::Result<()> {
    let scraper = Arc::new(Scraper::new(&config.scraper).context("Failed to build scraper")?);
    tracing::info!("Scraper ready with {} workers per job", scraper.concurrency());

    let modifiers = config
        .scraper
        .headers
        .iter()
        .map(|(name, value)| header_modifier(name, value))
        .collect::<Result<Vec<RequestModifier>, _>>()
        .context("Invalid extra header")?;

    let store = Arc::new(InMemoryJobStore::new());
    let service = LinkJobService::new(store, scraper.clone()).with_modifiers(modifiers);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", config.server.bind_address))?;

    api::serve(listener, service.clone(), shutdown_signal())
        .await
        .context("Server error")?;

    let deadline = Duration::from_secs(config.server.shutdown_timeout);
    tracing::info!(
        "Waiting up to {}s for {} running scrapes",
        deadline.as_secs(),
        scraper.in_flight()
    );

    if let Err(e) = scraper.close(deadline).await {
        tracing::warn!("{}", e);
        // The scrapes themselves are left running; cancelling only stops
        // their jobs from dispatching more pages before the runtime exits
        service.cancel_all();
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
