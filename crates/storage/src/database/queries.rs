use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use common::FileRecord;
use sqlx::{PgPool, Postgres};

type RecordRow = (String, String, String, String, i64, DateTime<Utc>);

/// Query operations for database storage
pub struct Queries;

impl Queries {
    pub async fn load_records(pool: &PgPool) -> Result<Vec<FileRecord>> {
        let rows = sqlx::query_as::<_, RecordRow>(
            "SELECT stored_id, original_filename, content_digest, hmac, file_size, upload_time
             FROM file_records ORDER BY seq",
        )
        .fetch_all(pool)
        .await
        .context("Failed to load file records")?;

        rows.into_iter().map(Self::record_from_row).collect()
    }

    pub async fn insert_record(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        record: &FileRecord,
    ) -> Result<()> {
        let file_size =
            i64::try_from(record.file_size).context("File size does not fit the database")?;
        sqlx::query(
            "INSERT INTO file_records
                (stored_id, original_filename, content_digest, hmac, file_size, upload_time)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&record.stored_id)
        .bind(&record.original_filename)
        .bind(&record.content_digest)
        .bind(&record.hmac)
        .bind(file_size)
        .bind(record.upload_time)
        .execute(executor)
        .await
        .context("Failed to insert file record")?;
        Ok(())
    }

    pub async fn insert_blob(
        executor: impl sqlx::Executor<'_, Database = Postgres>,
        stored_id: &str,
        content: &[u8],
    ) -> Result<()> {
        sqlx::query("INSERT INTO file_blobs (stored_id, content) VALUES ($1, $2)")
            .bind(stored_id)
            .bind(content)
            .execute(executor)
            .await
            .context("Failed to store file content")?;
        Ok(())
    }

    pub async fn read_blob(pool: &PgPool, stored_id: &str) -> Result<Option<Vec<u8>>> {
        let row =
            sqlx::query_as::<_, (Vec<u8>,)>("SELECT content FROM file_blobs WHERE stored_id = $1")
                .bind(stored_id)
                .fetch_optional(pool)
                .await
                .context("Failed to query file content")?;

        Ok(row.map(|(content,)| content))
    }

    /// Returns the number of blobs updated
    pub async fn update_blob(pool: &PgPool, stored_id: &str, content: &[u8]) -> Result<u64> {
        let result = sqlx::query("UPDATE file_blobs SET content = $2 WHERE stored_id = $1")
            .bind(stored_id)
            .bind(content)
            .execute(pool)
            .await
            .context("Failed to update file content")?;
        Ok(result.rows_affected())
    }

    /// Deleting a record cascades to its blob. Returns the number of records removed.
    pub async fn delete_record(pool: &PgPool, stored_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM file_records WHERE stored_id = $1")
            .bind(stored_id)
            .execute(pool)
            .await
            .context("Failed to delete file record")?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all(pool: &PgPool) -> Result<u64> {
        let result = sqlx::query("DELETE FROM file_records")
            .execute(pool)
            .await
            .context("Failed to delete file records")?;
        Ok(result.rows_affected())
    }

    fn record_from_row(row: RecordRow) -> Result<FileRecord> {
        let (stored_id, original_filename, content_digest, hmac, file_size, upload_time) = row;
        Ok(FileRecord {
            file_size: u64::try_from(file_size)
                .with_context(|| format!("Negative file size stored for {}", stored_id))?,
            stored_id,
            original_filename,
            content_digest,
            hmac,
            upload_time,
        })
    }
}
