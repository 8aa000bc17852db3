use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use unifeed::app::AppContext;
use unifeed::cli::{commands, Cli, Commands};
use unifeed::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let workers = cli.workers.unwrap_or(config.fetcher.workers);
    let ctx = AppContext::with_workers(config, workers)?;

    match cli.command {
        Commands::Detect { location } => {
            commands::detect(&ctx, &location).await?;
        }
        Commands::Parse {
            location,
            mode,
            sort,
            json,
        } => {
            commands::parse_feed(&ctx, &location, mode, sort, json).await?;
        }
        Commands::Batch { locations } => {
            commands::batch(&ctx, locations).await?;
        }
    }

    Ok(())
}
