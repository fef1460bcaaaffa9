//! Filesystem-based storage implementation
//!
//! Layout under the data directory:
//! - `records.json`: every record, in insertion order
//! - `files/<stored_id>`: the stored bytes
//! - `.lock`: held exclusively while a server owns the directory

mod metadata;

use crate::Storage;
use anyhow::{Context, Result};
use async_trait::async_trait;
use common::{file_utils, FileRecord};
use fs2::FileExt;
use metadata::Metadata;
use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

const RECORDS_FILE: &str = "records.json";
const FILES_DIR: &str = "files";
const LOCK_FILE: &str = ".lock";

/// Filesystem-based storage implementation
pub struct FilesystemStorage {
    data_dir: PathBuf,
    // Released when the storage is dropped
    _lock: File,
}

impl FilesystemStorage {
    /// Open (creating if needed) a data directory and take its lock.
    /// Fails if another process already holds the directory.
    pub async fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(data_dir.join(FILES_DIR))
            .await
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let lock_path = data_dir.join(LOCK_FILE);
        let lock = File::create(&lock_path).context("Failed to create lock file")?;
        lock.try_lock_exclusive().with_context(|| {
            format!("Data directory {:?} is already in use", data_dir)
        })?;

        info!("Filesystem storage opened at {:?}", data_dir);
        Ok(Self {
            data_dir,
            _lock: lock,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn metadata_file(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILE)
    }

    fn files_dir(&self) -> PathBuf {
        self.data_dir.join(FILES_DIR)
    }

    fn file_path(&self, stored_id: &str) -> Result<PathBuf> {
        file_utils::validate_filename(stored_id)
            .map_err(|e| anyhow::anyhow!("Invalid stored id {:?}: {}", stored_id, e))?;
        Ok(self.files_dir().join(stored_id))
    }

    async fn write_synced(path: &Path, content: &[u8]) -> Result<()> {
        let mut file = tokio::fs::File::create(path)
            .await
            .with_context(|| format!("Failed to create file {:?}", path))?;
        file.write_all(content)
            .await
            .with_context(|| format!("Failed to write file {:?}", path))?;
        file.sync_all()
            .await
            .with_context(|| format!("Failed to sync file {:?}", path))?;
        Ok(())
    }

    async fn remove_if_exists(path: &Path) -> Result<bool> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove file {:?}", path)),
        }
    }
}

#[async_trait]
impl Storage for FilesystemStorage {
    async fn load_records(&self) -> Result<Vec<FileRecord>> {
        Metadata::load(&self.metadata_file()).await
    }

    async fn store_file_with_record(&self, record: &FileRecord, content: &[u8]) -> Result<()> {
        let file_path = self.file_path(&record.stored_id)?;
        let metadata_file = self.metadata_file();

        let mut records = Metadata::load(&metadata_file).await?;
        if records.iter().any(|r| r.stored_id == record.stored_id) {
            anyhow::bail!("Record {} already exists", record.stored_id);
        }

        if let Err(e) = Self::write_synced(&file_path, content).await {
            let _ = Self::remove_if_exists(&file_path).await;
            return Err(e);
        }

        records.push(record.clone());
        if let Err(e) = Metadata::save_atomic(&metadata_file, &records).await {
            // Roll back so no file is left without a record
            if let Err(cleanup) = Self::remove_if_exists(&file_path).await {
                warn!(
                    "Failed to remove {:?} after metadata write failure: {}",
                    file_path, cleanup
                );
            }
            return Err(e);
        }
        Ok(())
    }

    async fn read_file(&self, stored_id: &str) -> Result<Vec<u8>> {
        let file_path = self.file_path(stored_id)?;
        tokio::fs::read(&file_path)
            .await
            .with_context(|| format!("Failed to read file: {:?}", file_path))
    }

    async fn overwrite_file(&self, stored_id: &str, content: &[u8]) -> Result<()> {
        let file_path = self.file_path(stored_id)?;
        if !tokio::fs::try_exists(&file_path).await? {
            anyhow::bail!("File {} does not exist", stored_id);
        }

        let temp_path = self.files_dir().join(format!(".{}.tmp", stored_id));
        if let Err(e) = Self::write_synced(&temp_path, content).await {
            let _ = Self::remove_if_exists(&temp_path).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&temp_path, &file_path).await {
            let _ = Self::remove_if_exists(&temp_path).await;
            return Err(e).context("Failed to replace stored file");
        }
        Ok(())
    }

    async fn delete_file_with_record(&self, stored_id: &str) -> Result<()> {
        let file_path = self.file_path(stored_id)?;
        let metadata_file = self.metadata_file();

        let records = Metadata::load(&metadata_file).await?;
        let remaining: Vec<FileRecord> = records
            .iter()
            .filter(|r| r.stored_id != stored_id)
            .cloned()
            .collect();
        if remaining.len() == records.len() {
            anyhow::bail!("Record {} not found", stored_id);
        }

        Metadata::save_atomic(&metadata_file, &remaining).await?;

        if let Err(e) = Self::remove_if_exists(&file_path).await {
            // Put the record back so it does not outlive its file's removal failure
            Metadata::save_atomic(&metadata_file, &records)
                .await
                .context("Failed to restore metadata after file removal failure")?;
            return Err(e);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<usize> {
        // The empty record list is the commit point; files a later failure
        // leaves behind are orphans for the next sweep
        Metadata::save_atomic(&self.metadata_file(), &[]).await?;

        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(self.files_dir())
            .await
            .context("Failed to read files directory")?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && Self::remove_if_exists(&path).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn sweep_orphans(&self) -> Result<usize> {
        let known: HashSet<String> = self
            .load_records()
            .await?
            .into_iter()
            .map(|r| r.stored_id)
            .collect();

        let mut removed = 0;
        let mut entries = tokio::fs::read_dir(self.files_dir())
            .await
            .context("Failed to read files directory")?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if !entry.file_type().await?.is_file() || known.contains(&name) {
                continue;
            }
            warn!("Removing orphaned file {:?}", entry.path());
            if Self::remove_if_exists(&entry.path()).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
