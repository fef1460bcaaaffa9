use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

/// Database schema manager
pub struct Schema;

impl Schema {
    /// Create the tables and indexes if they do not exist yet
    pub async fn initialize(pool: &PgPool) -> Result<()> {
        Self::create_file_records_table(pool).await?;
        Self::create_file_blobs_table(pool).await?;
        Self::create_indexes(pool).await?;
        info!("PostgreSQL schema ready");
        Ok(())
    }

    /// `seq` keeps insertion order, which breaks upload-time ties during matching
    async fn create_file_records_table(pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS file_records (
                seq BIGSERIAL NOT NULL,
                stored_id VARCHAR(300) PRIMARY KEY,
                original_filename VARCHAR(255) NOT NULL,
                content_digest CHAR(64) NOT NULL,
                hmac VARCHAR(64) NOT NULL,
                file_size BIGINT NOT NULL,
                upload_time TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create file_records table")?;
        Ok(())
    }

    async fn create_file_blobs_table(pool: &PgPool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS file_blobs (
                stored_id VARCHAR(300) PRIMARY KEY,
                content BYTEA NOT NULL,
                FOREIGN KEY (stored_id) REFERENCES file_records(stored_id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(pool)
        .await
        .context("Failed to create file_blobs table")?;
        Ok(())
    }

    async fn create_indexes(pool: &PgPool) -> Result<()> {
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_file_records_digest ON file_records(content_digest)",
        )
        .execute(pool)
        .await
        .context("Failed to create digest index")?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_file_records_filename ON file_records(original_filename)",
        )
        .execute(pool)
        .await
        .context("Failed to create filename index")?;
        Ok(())
    }
}
