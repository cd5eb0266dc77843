#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use uuid::Uuid;

use orgboard_api::database::models::User;
use orgboard_api::database::{DatabaseManager, QuerySettings};
use orgboard_api::repositories::{PgUserRepository, UserRepository};
use orgboard_api::services::Services;

/// A migrated, throwaway schema. Tests skip when `DATABASE_URL` is unset.
pub struct TestDb {
    pub db: DatabaseManager,
    admin: PgPool,
    schema: String,
}

impl TestDb {
    pub async fn connect() -> Result<Option<Self>> {
        let _ = dotenvy::dotenv();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping database test");
            return Ok(None);
        };

        let schema = format!("test_{}", Uuid::new_v4().simple());
        let admin = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .context("failed to connect to DATABASE_URL")?;
        sqlx::query(&format!("CREATE SCHEMA {}", schema)).execute(&admin).await?;

        let options = PgConnectOptions::from_str(&url)?.options([("search_path", schema.as_str())]);
        let pool = PgPoolOptions::new().max_connections(5).connect_with(options).await?;

        let db = DatabaseManager::from_pools(pool.clone(), pool, QuerySettings::default());
        db.run_migrations().await.context("failed to migrate test schema")?;

        Ok(Some(Self { db, admin, schema }))
    }

    pub fn services(&self) -> Services {
        Services::new(&self.db)
    }

    pub fn users(&self) -> PgUserRepository {
        PgUserRepository::new(&self.db)
    }

    /// Insert a user with a unique email and code.
    pub async fn seed_user(&self, label: &str) -> Result<User> {
        let tag = Uuid::new_v4().simple().to_string();
        let user = User {
            first_name: label.to_string(),
            last_name: "Tester".to_string(),
            code: tag.clone(),
            email: format!("{}-{}@example.com", label, &tag[..8]),
            ..User::default()
        };
        Ok(self.users().create(user).await?)
    }

    pub async fn cleanup(self) -> Result<()> {
        self.db.close().await;
        sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema))
            .execute(&self.admin)
            .await?;
        self.admin.close().await;
        Ok(())
    }
}

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    pub fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = Command::new(env!("CARGO_BIN_EXE_orgboard"))
            .args(["serve", "--port", &port.to_string()])
            .env("AUTO_MIGRATE", "false")
            .env("DATABASE_CONNECTION_TIMEOUT", "1")
            .env("HOST", "127.0.0.1")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    pub async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Ready once the server answers, with or without a database behind it
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
