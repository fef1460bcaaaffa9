//! PostgreSQL database storage implementation

mod queries;
mod schema;

use crate::Storage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use common::FileRecord;
use queries::Queries;
use schema::Schema;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

const DEFAULT_MAX_ATTEMPTS: u32 = 5;
const DEFAULT_INITIAL_DELAY_SECONDS: u64 = 1;

/// How long to keep retrying the initial database connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseRetryConfig {
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after every failure
    pub initial_delay_seconds: u64,
}

impl Default for DatabaseRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay_seconds: DEFAULT_INITIAL_DELAY_SECONDS,
        }
    }
}

impl DatabaseRetryConfig {
    /// Read `DB_MAX_RETRY_ATTEMPTS` and `DB_INITIAL_RETRY_DELAY_SECONDS`,
    /// falling back to the defaults for unset or unparsable values
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("DB_MAX_RETRY_ATTEMPTS").ok().as_deref(),
            std::env::var("DB_INITIAL_RETRY_DELAY_SECONDS").ok().as_deref(),
        )
    }

    fn from_values(max_attempts: Option<&str>, initial_delay_seconds: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            max_attempts: max_attempts
                .and_then(|v| v.trim().parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_attempts),
            initial_delay_seconds: initial_delay_seconds
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.initial_delay_seconds),
        }
    }

    /// Delay after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_secs(self.initial_delay_seconds.saturating_mul(factor))
    }
}

/// PostgreSQL database storage implementation
pub struct DatabaseStorage {
    pool: PgPool,
}

impl DatabaseStorage {
    /// Connect (retrying with exponential backoff) and make sure the schema exists
    pub async fn new(database_url: &str, retry_config: &DatabaseRetryConfig) -> Result<Self> {
        let pool = Self::connect_with_retry(database_url, retry_config).await?;
        Schema::initialize(&pool).await?;
        Ok(Self { pool })
    }

    async fn connect_with_retry(
        database_url: &str,
        retry_config: &DatabaseRetryConfig,
    ) -> Result<PgPool> {
        let mut attempt = 1;
        loop {
            match PgPool::connect(database_url).await {
                Ok(pool) => {
                    info!("Connected to PostgreSQL on attempt {}", attempt);
                    return Ok(pool);
                }
                Err(e) if attempt < retry_config.max_attempts => {
                    let delay = retry_config.delay_after(attempt);
                    warn!(
                        "Database connection attempt {}/{} failed: {}. Retrying in {:?}",
                        attempt, retry_config.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!(
                            "Failed to connect to PostgreSQL database after {} attempts",
                            attempt
                        )
                    })
                }
            }
        }
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn load_records(&self) -> Result<Vec<FileRecord>> {
        Queries::load_records(&self.pool).await
    }

    async fn store_file_with_record(&self, record: &FileRecord, content: &[u8]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        Queries::insert_record(&mut *tx, record).await?;
        Queries::insert_blob(&mut *tx, &record.stored_id, content).await?;

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(())
    }

    async fn read_file(&self, stored_id: &str) -> Result<Vec<u8>> {
        match Queries::read_blob(&self.pool, stored_id).await? {
            Some(content) => Ok(content),
            None => anyhow::bail!("File {} not found", stored_id),
        }
    }

    async fn overwrite_file(&self, stored_id: &str, content: &[u8]) -> Result<()> {
        if Queries::update_blob(&self.pool, stored_id, content).await? == 0 {
            anyhow::bail!("File {} not found", stored_id);
        }
        Ok(())
    }

    async fn delete_file_with_record(&self, stored_id: &str) -> Result<()> {
        if Queries::delete_record(&self.pool, stored_id).await? == 0 {
            anyhow::bail!("Record {} not found", stored_id);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<usize> {
        let removed = Queries::delete_all(&self.pool).await?;
        Ok(removed as usize)
    }
}
