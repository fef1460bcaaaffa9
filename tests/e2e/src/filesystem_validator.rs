use anyhow::{Context, Result};
use common::{FileRecord, FileSummary};
use std::fs;
use std::path::Path;

fn load_records(server_data_dir: &Path) -> Result<Vec<FileRecord>> {
    let records_file = server_data_dir.join("records.json");
    if !records_file.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(&records_file).context("Failed to read records file")?;
    serde_json::from_str(&content).context("Failed to parse records JSON")
}

/// Check that every uploaded file has a persisted record and blob matching what the API returned
pub fn validate_upload(server_data_dir: &Path, uploaded: &[FileSummary]) -> Result<()> {
    let records = load_records(server_data_dir)?;
    println!("  ✓ records.json holds {} records", records.len());

    for summary in uploaded {
        let record = records
            .iter()
            .find(|r| r.stored_id == summary.filename)
            .with_context(|| format!("Record {} not found in records.json", summary.filename))?;

        if record.hmac != summary.hmac || record.content_digest != summary.content_digest {
            anyhow::bail!("Persisted record {} differs from upload response", record.stored_id);
        }

        let blob = server_data_dir.join("files").join(&record.stored_id);
        let size = fs::metadata(&blob)
            .with_context(|| format!("Stored file does not exist: {:?}", blob))?
            .len();
        if size != record.file_size {
            anyhow::bail!(
                "Stored file {} has {} bytes, record says {}",
                record.stored_id,
                size,
                record.file_size
            );
        }
    }

    println!("  ✓ All {} uploaded files persisted on disk", uploaded.len());
    Ok(())
}

pub fn validate_removed(server_data_dir: &Path, stored_id: &str) -> Result<()> {
    if load_records(server_data_dir)?
        .iter()
        .any(|r| r.stored_id == stored_id)
    {
        anyhow::bail!("Record {} still present in records.json", stored_id);
    }
    if server_data_dir.join("files").join(stored_id).exists() {
        anyhow::bail!("Stored file {} still present on disk", stored_id);
    }
    println!("  ✓ {} removed from disk", stored_id);
    Ok(())
}

pub fn validate_empty(server_data_dir: &Path) -> Result<()> {
    let records = load_records(server_data_dir)?;
    if !records.is_empty() {
        anyhow::bail!("Expected no records, found {}", records.len());
    }

    let files_dir = server_data_dir.join("files");
    if files_dir.exists() {
        let remaining = fs::read_dir(&files_dir)
            .context("Failed to list files directory")?
            .count();
        if remaining != 0 {
            anyhow::bail!("Expected empty files directory, found {} entries", remaining);
        }
    }

    println!("  ✓ Store is empty on disk");
    Ok(())
}
