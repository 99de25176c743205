//! Commons scraper CLI application.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use commons_scraper::{Backoff, CommonsClient, LicenseCrawler, ReportWriter};
use shared::{Config, DataPaths, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Category to start from instead of the configured root
    #[arg(long)]
    root: Option<String>,

    /// Directory to write the report into instead of the configured one
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write the default configuration to the config path and exit
    #[arg(long)]
    init_config: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tokio::select! {
        result = run(args) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %format!("{:#}", e), "Commons scraper failed");
                eprintln!("ERROR (1) Unhandled exception: {:?}", e);
                ExitCode::from(1)
            }
        },
        _ = interrupted() => {
            eprintln!("INFO (130) Halted via interrupt.");
            ExitCode::from(130)
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for interrupt signal");
        std::future::pending::<()>().await;
    }
}

async fn run(args: Args) -> Result<()> {
    if args.init_config {
        Config::default()
            .save(&args.config)
            .with_context(|| format!("Failed to write config to {}", args.config.display()))?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    // Load configuration
    let loaded = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    let config_found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();

    if let Some(root) = &args.root {
        config.scraper.root_category = root.clone();
    }
    config.validate().context("Invalid configuration")?;

    // Initialize logging
    let log_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        shared::logging::parse_level(&config.logging.default_level)
    };

    shared::logging::init(LogConfig {
        log_dir: config.log_dir().to_string_lossy().to_string(),
        component: "commons-scraper".to_string(),
        default_level: log_level,
        console: config.logging.console,
        file: config.logging.file,
        json_format: config.logging.json_format,
    })?;

    info!("Commons scraper starting");
    if !config_found {
        warn!(path = %args.config.display(), "Config file not found, using defaults");
    }
    info!(
        config_file = %args.config.display(),
        root = %config.scraper.root_category,
        base_url = %config.scraper.base_url,
        "Loaded configuration"
    );

    // Initialize output paths
    let report_dir = args.output_dir.clone().unwrap_or_else(|| config.report_dir());
    let data_paths = DataPaths::new(report_dir, config.log_dir());
    data_paths
        .create_dirs()
        .context("Failed to create output directories")?;

    let report_path = data_paths.report_file(Local::now().date_naive());
    let report = ReportWriter::create(&report_path).context("Failed to initialize report")?;

    // Initialize API client
    let scraper = &config.scraper;
    let client = CommonsClient::new(
        scraper.base_url.clone(),
        &scraper.user_agent,
        Duration::from_secs(scraper.request_timeout_secs),
        scraper.members_per_request,
        scraper.max_retries,
        Backoff::new(scraper.backoff.base, scraper.backoff.max_wait_secs),
    )
    .context("Failed to create Commons client")?;

    // Run census
    let mut crawler = LicenseCrawler::new(client, report);
    let stats = crawler
        .run(&scraper.root_category)
        .await
        .context("License census failed")?;

    info!("=== Census Complete ===");
    info!("Categories recorded: {}", stats.recorded);
    info!("Categories skipped: {}", stats.skipped);
    info!("Subtrees truncated: {}", stats.truncated);
    info!("Duplicate encounters: {}", stats.duplicates);

    info!(
        report = %report_path.display(),
        rows = crawler.report().rows_written(),
        "Commons scraper finished successfully"
    );

    Ok(())
}
