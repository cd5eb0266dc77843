use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Per-statement logging knobs handed to every repository.
#[derive(Debug, Clone)]
pub struct QuerySettings {
    pub log_queries: bool,
    pub slow_query_threshold: Duration,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            log_queries: false,
            slow_query_threshold: Duration::from_millis(1000),
        }
    }
}

impl From<&DatabaseConfig> for QuerySettings {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            log_queries: config.enable_query_logging,
            slow_query_threshold: Duration::from_millis(config.slow_query_threshold_ms),
        }
    }
}

/// Primary (write) and replica (read) pools.
///
/// Without a replica URL both handles point at the primary pool.
#[derive(Clone)]
pub struct DatabaseManager {
    primary: PgPool,
    replica: PgPool,
    settings: QuerySettings,
}

impl DatabaseManager {
    /// Build lazily-connecting pools from configuration. Connections open on first use.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let primary_url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;
        let primary = Self::build_pool(config, primary_url)?;

        let replica = match config.replica_url.as_deref() {
            Some(url) if url != primary_url => Self::build_pool(config, url)?,
            _ => primary.clone(),
        };

        Ok(Self {
            primary,
            replica,
            settings: QuerySettings::from(config),
        })
    }

    pub fn from_pools(primary: PgPool, replica: PgPool, settings: QuerySettings) -> Self {
        Self { primary, replica, settings }
    }

    fn build_pool(config: &DatabaseConfig, raw_url: &str) -> Result<PgPool, DatabaseError> {
        let url = Self::validate_url(raw_url)?;
        let options: PgConnectOptions = url.as_str().parse()?;

        info!("Configured database pool for {}", Self::redact(&url));
        Ok(PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_lazy_with(options))
    }

    fn validate_url(raw: &str) -> Result<url::Url, DatabaseError> {
        let url = url::Url::parse(raw).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        match url.scheme() {
            "postgres" | "postgresql" => Ok(url),
            _ => Err(DatabaseError::InvalidDatabaseUrl),
        }
    }

    /// Connection string safe for logs.
    fn redact(url: &url::Url) -> String {
        let mut shown = url.clone();
        if shown.password().is_some() {
            let _ = shown.set_password(Some("***"));
        }
        shown.to_string()
    }

    pub fn primary(&self) -> &PgPool {
        &self.primary
    }

    pub fn replica(&self) -> &PgPool {
        &self.replica
    }

    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    /// Pings both pools to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.primary).await?;
        sqlx::query("SELECT 1").execute(&self.replica).await?;
        Ok(())
    }

    /// Apply the embedded migrations on the primary pool.
    pub async fn run_migrations(&self) -> Result<(), DatabaseError> {
        super::MIGRATOR.run(&self.primary).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn close(&self) {
        self.replica.close().await;
        self.primary.close().await;
        info!("Closed database pools");
    }
}
