mod cli;

use ccingest::config::Config;
use ccingest::ingest::{Ingestor, write_records};
use ccingest::providers::{IngestContext, mccord, thingiverse};
use ccingest::window::{PageWindow, default_run_date};
use clap::Parser;
use cli::{Cli, Commands};
use time::OffsetDateTime;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Records go to stdout, logs to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config)?;
    let ingestor = Ingestor::from_config(&config)?;

    let (provider, ctx) = match cli.command {
        Commands::Providers => {
            for name in ingestor.registry().names() {
                println!("{}", name);
            }
            return Ok(());
        }
        Commands::Thingiverse(args) => {
            let date = args
                .date
                .unwrap_or_else(|| default_run_date(OffsetDateTime::now_utc()));
            info!(%date, "Processing date");
            (
                thingiverse::PROVIDER,
                IngestContext::for_window(PageWindow::from_date(date)),
            )
        }
        Commands::Mccord(args) => (mccord::PROVIDER, IngestContext::for_pages(args.urls)),
    };

    let records = ingestor.run(provider, ctx).await?;
    let written = write_records(&records, std::io::stdout().lock())?;
    info!(provider, written, "Records written");

    Ok(())
}
