//! Image-Soup main entry point
//!
//! This is the command-line interface for the Image-Soup image server.

use anyhow::{Context, Result};
use clap::Parser;
use image_soup::config::{build_pool, build_server, load_config_with_hash, Config, DEFAULT_CONFIG};
use image_soup::webserver;
use image_soup::Registry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Image-Soup: a randomized image pool fed by many sources
///
/// Image-Soup crawls images from the configured sources into a deduplicated
/// pool, keeps it filled in the background and serves random picks over HTTP.
#[derive(Parser, Debug)]
#[command(name = "image-soup")]
#[command(version)]
#[command(about = "Serves random images crawled from many sources", long_about = None)]
struct Cli {
    /// Path to TOML configuration file, the built-in defaults when omitted
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Allow cross-origin requests from anywhere
    #[arg(long)]
    develop: bool,

    /// Validate config and show the crawler setup without serving
    #[arg(long, conflicts_with_all = ["list_crawlers", "dump_defaults"])]
    dry_run: bool,

    /// List the known crawlers and exit
    #[arg(long, conflicts_with_all = ["dry_run", "dump_defaults"])]
    list_crawlers: bool,

    /// Print the built-in default configuration and exit
    #[arg(long, conflicts_with_all = ["dry_run", "list_crawlers"])]
    dump_defaults: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let registry = Registry::builtin();

    if cli.dump_defaults {
        print!("{}", DEFAULT_CONFIG);
        return Ok(());
    }
    if cli.list_crawlers {
        handle_list_crawlers(&registry);
        return Ok(());
    }

    let (config, config_hash) = load_config_with_hash(cli.config.as_deref())
        .with_context(|| match &cli.config {
            Some(path) => format!("failed to load configuration from {}", path.display()),
            None => "failed to load the built-in configuration".to_string(),
        })?;

    setup_logging(cli.verbose, cli.quiet, &config.logging.level);
    match &cli.config {
        Some(path) => tracing::info!("Configuration loaded from: {}", path.display()),
        None => tracing::info!("Using built-in configuration"),
    }
    tracing::info!("Configuration hash: {}", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, &registry)
    } else {
        handle_serve(&config, &registry, cli.develop).await
    }
}

/// Sets up the logging/tracing subscriber
///
/// `RUST_LOG` wins over everything, then `-q` and `-v`, then the configured
/// level.
fn setup_logging(verbose: u8, quiet: bool, level: &str) {
    let directives = if quiet {
        // Only show errors
        "error".to_string()
    } else {
        match verbose {
            0 => format!("image_soup={},warn", level.to_ascii_lowercase()),
            1 => "image_soup=debug,info".to_string(),
            2 => "image_soup=trace,debug".to_string(),
            _ => "trace".to_string(),
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --list-crawlers mode
fn handle_list_crawlers(registry: &Registry) {
    println!("=== Known Crawlers ===");
    for name in registry.names() {
        println!("\n{}", name);
        if let Some(info) = registry.info(name) {
            println!("  {}", info.description);
            for (key, meaning) in info.config {
                println!("  - {}: {}", key, meaning);
            }
        }
    }
}

/// Handles the --dry-run mode: validates config and shows the crawler setup
fn handle_dry_run(config: &Config, registry: &Registry) -> Result<()> {
    println!("=== Image-Soup Dry Run ===\n");

    println!("Web Server:");
    println!("  Address: {}:{}", config.webserver.hostname, config.webserver.port);

    println!("\nImage Server:");
    println!("  Crawler upkeep: {}", config.imageserver.crawler_upkeep);
    println!("  Reset timeout: {}s", config.imageserver.reset_timeout);

    let pool = build_pool(config, registry).context("invalid crawler setup")?;

    println!("\nCrawlers ({}):", pool.sources().len());
    for source in pool.sources().iter() {
        println!("  - {} (weight {})", source, source.weight());
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main serving operation, until Ctrl-C
async fn handle_serve(config: &Config, registry: &Registry, develop: bool) -> Result<()> {
    let server = Arc::new(build_server(config, registry).context("invalid crawler setup")?);
    tracing::info!(
        "Registered {} crawlers, keeping {} images each",
        server.pool().sources().len(),
        server.keep()
    );

    server.start().await?;

    let app = webserver::router(Arc::clone(&server), develop);
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
        tracing::info!("Shutting down");
    };
    let served = webserver::serve(
        app,
        &config.webserver.hostname,
        config.webserver.port,
        shutdown,
    )
    .await;

    server.stop().await?;
    served.context("web server failed")
}
