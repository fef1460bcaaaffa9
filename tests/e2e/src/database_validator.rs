use anyhow::{Context, Result};
use common::FileSummary;
use sqlx::PgPool;

async fn connect(database_url: &str) -> Result<PgPool> {
    PgPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Check that every uploaded file has a row and blob matching what the API returned
pub async fn validate_upload(database_url: &str, uploaded: &[FileSummary]) -> Result<()> {
    let pool = connect(database_url).await?;

    let record_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM file_records")
        .fetch_one(&pool)
        .await
        .context("Failed to count records")?;
    println!("  ✓ file_records holds {} rows", record_count);

    for summary in uploaded {
        let row: Option<(String, String, i64)> = sqlx::query_as(
            "SELECT hmac, content_digest, file_size FROM file_records WHERE stored_id = $1",
        )
        .bind(&summary.filename)
        .fetch_optional(&pool)
        .await
        .with_context(|| format!("Failed to fetch record {}", summary.filename))?;

        let (hmac, content_digest, file_size) =
            row.with_context(|| format!("Record {} not found in database", summary.filename))?;
        if hmac != summary.hmac || content_digest != summary.content_digest {
            anyhow::bail!("Persisted record {} differs from upload response", summary.filename);
        }

        let blob_len: Option<i32> = sqlx::query_scalar(
            "SELECT LENGTH(content) FROM file_blobs WHERE stored_id = $1",
        )
        .bind(&summary.filename)
        .fetch_optional(&pool)
        .await
        .with_context(|| format!("Failed to fetch blob {}", summary.filename))?;

        match blob_len {
            Some(len) if i64::from(len) == file_size => {}
            Some(len) => anyhow::bail!(
                "Blob {} has {} bytes, record says {}",
                summary.filename,
                len,
                file_size
            ),
            None => anyhow::bail!("Blob {} not found in database", summary.filename),
        }
    }

    println!("  ✓ All {} uploaded files persisted in database", uploaded.len());
    Ok(())
}

pub async fn validate_removed(database_url: &str, stored_id: &str) -> Result<()> {
    let pool = connect(database_url).await?;

    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM file_records WHERE stored_id = $1)
            OR EXISTS(SELECT 1 FROM file_blobs WHERE stored_id = $1)",
    )
    .bind(stored_id)
    .fetch_one(&pool)
    .await
    .context("Failed to check removed record")?;

    if exists {
        anyhow::bail!("{} still present in database", stored_id);
    }
    println!("  ✓ {} removed from database", stored_id);
    Ok(())
}

pub async fn validate_empty(database_url: &str) -> Result<()> {
    let pool = connect(database_url).await?;

    let (records, blobs): (i64, i64) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM file_records), (SELECT COUNT(*) FROM file_blobs)",
    )
    .fetch_one(&pool)
    .await
    .context("Failed to count rows")?;

    if records != 0 || blobs != 0 {
        anyhow::bail!(
            "Expected empty database, found {} records and {} blobs",
            records,
            blobs
        );
    }
    println!("  ✓ Store is empty in database");
    Ok(())
}
