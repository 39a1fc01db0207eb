//! mirror-watch - one watch pass over configured accounts
//!
//! Designed to run from cron: loads config, processes every account once,
//! and exits 0 only when no account errored.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use libmirrorcast::logging::{LogFormat, LoggingConfig};
use libmirrorcast::processor::RunSummary;
use libmirrorcast::{AccountProcessor, Config, HttpFetcher, RelayPublisher, Result, StateStore};

#[derive(Parser, Debug)]
#[command(name = "mirror-watch")]
#[command(about = "Mirror new X posts to Nostr relays", long_about = None)]
struct Cli {
    /// Config file path (defaults to $MIRRORCAST_CONFIG or the XDG config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log output format (text, json, or pretty)
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let format = cli.log_format.parse().unwrap_or(LogFormat::Text);
    let level = std::env::var("MIRRORCAST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    LoggingConfig::new(format, level, cli.verbose).init();

    match run(cli).await {
        Ok(summary) => {
            info!("Run complete: {}", summary);
            std::process::exit(summary.exit_code());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> Result<RunSummary> {
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    let credential = config.load_credential()?;

    let fetcher = HttpFetcher::new(&config.mirror);
    let publisher = RelayPublisher::from_config(&config.nostr, credential);
    let state = StateStore::load(config.state_path());

    info!(
        "Starting watch pass over {} account(s) via {}",
        config.accounts.len(),
        config.mirror.base_url
    );

    let mut processor = AccountProcessor::new(Box::new(fetcher), Box::new(publisher), state);
    Ok(processor.run(&config.accounts).await)
}
