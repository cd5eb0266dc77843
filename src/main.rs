use clap::Parser;
use tracing::info;

use orgboard_api::cli::{self, Cli};
use orgboard_api::config::AppConfig;
use orgboard_api::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, PORT, etc.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = AppConfig::from_env();
    logging::init_tracing(&config)?;
    info!("Starting orgboard in {:?} mode", config.environment);

    cli::run(cli, config).await
}
