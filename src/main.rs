mod cli;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use lotorrent::{CrawlConfig, Crawler, HttpFetcher};
use std::process;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Validate CLI arguments first
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    // Initialize logging based on verbosity, RUST_LOG wins when set
    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stdout)
        .init();

    let mut config = CrawlConfig::load(args.config.as_deref())?;
    args.apply_to(&mut config);

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation failed: {}", e);
        process::exit(1);
    }

    let output_dir = config.prepare_output_dir()?;
    let fetcher = HttpFetcher::new()?;

    let crawler = Crawler::new(&fetcher, &config, output_dir);
    crawler.run().await?;
    info!("torrents stored in '{}'", crawler.output_dir().display());

    Ok(())
}
