use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::app::{self, AppState};
use crate::config::AppConfig;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "orgboard")]
#[command(about = "Organization, user and project backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Override the listen port")]
        port: Option<u16>,
    },

    #[command(about = "Apply pending database migrations and exit")]
    Migrate,
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    let db = DatabaseManager::from_config(&config.database)?;

    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Migrate => {
            db.run_migrations().await?;
            db.close().await;
            Ok(())
        }
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, db).await
        }
    }
}

async fn serve(config: AppConfig, db: DatabaseManager) -> anyhow::Result<()> {
    if config.database.auto_migrate {
        db.run_migrations().await.context("auto migration failed")?;
    }

    let app = app::router(AppState { db: db.clone() });

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("orgboard listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["orgboard"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["orgboard", "serve", "--port", "4100"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Serve { port: Some(4100) }));

        let cli = Cli::try_parse_from(["orgboard", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
    }
}
