use anyhow::{Context, Result};
use common::FileRecord;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Filesystem record list manager (`records.json`, a JSON array in insertion order)
pub struct Metadata;

impl Metadata {
    /// Load records from the metadata file, or an empty list if it does not exist yet
    pub async fn load(metadata_file: &Path) -> Result<Vec<FileRecord>> {
        if !tokio::fs::try_exists(metadata_file)
            .await
            .context("Failed to check metadata file")?
        {
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(metadata_file)
            .await
            .context("Failed to read metadata")?;
        serde_json::from_str(&content).context("Failed to parse metadata")
    }

    /// Save records atomically: write a temp file, fsync it, then rename over the original
    pub async fn save_atomic(metadata_file: &Path, records: &[FileRecord]) -> Result<()> {
        let metadata_json =
            serde_json::to_string_pretty(records).context("Failed to serialize metadata")?;

        let temp_file = Self::temp_path(metadata_file);
        let mut file = tokio::fs::File::create(&temp_file)
            .await
            .context("Failed to create metadata temp file")?;
        file.write_all(metadata_json.as_bytes())
            .await
            .context("Failed to write metadata to temp file")?;
        file.sync_all()
            .await
            .context("Failed to sync metadata file to disk")?;
        drop(file);

        if let Err(e) = tokio::fs::rename(&temp_file, metadata_file).await {
            let _ = tokio::fs::remove_file(&temp_file).await;
            return Err(e).context("Failed to replace metadata file");
        }
        Ok(())
    }

    fn temp_path(metadata_file: &Path) -> PathBuf {
        let mut name = metadata_file
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        metadata_file.with_file_name(name)
    }
}
