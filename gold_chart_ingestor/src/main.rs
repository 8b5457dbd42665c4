use clap::Parser;
use tracing_subscriber::EnvFilter;

use gold_chart_ingestor::cli::{self, commands::Cli};

#[tokio::main]
async fn main() -> Result<(), gold_chart_ingestor::errors::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cli::run(cli).await
}
