//! The record store: every stored file record, guarded by one lock

use crate::{Storage, StoreError};
use chrono::{SubsecRound, Utc};
use common::{file_utils, FileRecord};
use quick_match::{MatchResult, Probe, SizeTolerance};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Appended to a stored file by [`RecordStore::tamper`]
pub const TAMPER_MARKER: &str = "\n[TAMPERED] This file has been modified!";

/// Longest accepted (sanitized) original filename, in bytes
pub const MAX_FILENAME_LEN: usize = 255;

/// Default upload extension allow-list
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &["txt"];

/// Tunables for a [`RecordStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub tolerance: SizeTolerance,
    /// Lowercase extensions without the dot. Empty accepts any filename.
    pub allowed_extensions: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            tolerance: SizeTolerance::default(),
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|e| e.to_string())
                .collect(),
        }
    }
}

/// Sizes before and after a simulated tamper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TamperReport {
    pub original_size: u64,
    pub tampered_size: u64,
}

/// Owns the `stored_id` to record/bytes mapping.
///
/// Every operation holds the store-wide lock across its backend I/O, so a
/// reader never observes a record whose bytes are half written or already
/// gone. Digests and HMACs of incoming files are computed before the lock is
/// taken.
pub struct RecordStore {
    backend: Arc<dyn Storage>,
    records: Mutex<Vec<FileRecord>>,
    config: StoreConfig,
}

impl RecordStore {
    /// Load the persisted records and remove stored files no record refers to
    pub async fn open(backend: Arc<dyn Storage>, config: StoreConfig) -> Result<Self, StoreError> {
        let records = backend
            .load_records()
            .await
            .map_err(StoreError::from_backend)?;
        let swept = backend
            .sweep_orphans()
            .await
            .map_err(StoreError::from_backend)?;
        if swept > 0 {
            warn!(swept, "Removed orphaned files at startup");
        }
        info!(records = records.len(), "Record store loaded");

        Ok(Self {
            backend,
            records: Mutex::new(records),
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Replace the in-memory records with what the backend has persisted
    pub async fn reload(&self) -> Result<usize, StoreError> {
        let mut records = self.records.lock().await;
        *records = self
            .backend
            .load_records()
            .await
            .map_err(StoreError::from_backend)?;
        Ok(records.len())
    }

    /// Sanitize a client-supplied filename and check it against the allow-list
    pub fn accept_filename(&self, filename: &str) -> Result<String, StoreError> {
        let name = file_utils::sanitize_filename(filename)?;
        if name.len() > MAX_FILENAME_LEN {
            return Err(StoreError::Validation(format!(
                "Filename is longer than {} bytes",
                MAX_FILENAME_LEN
            )));
        }
        file_utils::check_extension(&name, &self.config.allowed_extensions)?;
        Ok(name)
    }

    /// Store a new file. Nothing is recorded unless the bytes and the record
    /// were both persisted.
    pub async fn insert(
        &self,
        original_filename: &str,
        content: &[u8],
        secret_key: &[u8],
    ) -> Result<FileRecord, StoreError> {
        let original_filename = self.accept_filename(original_filename)?;
        let hmac = crypto::authenticate(content, secret_key)?;
        let content_digest = crypto::content_digest(content);

        let mut records = self.records.lock().await;
        let stored_id = loop {
            let candidate = format!("{}_{}", Uuid::new_v4().simple(), original_filename);
            if !records.iter().any(|r| r.stored_id == candidate) {
                break candidate;
            }
        };

        let record = FileRecord {
            stored_id,
            original_filename,
            content_digest,
            hmac,
            file_size: content.len() as u64,
            // Microseconds survive every backend, Postgres `timestamptz` included
            upload_time: Utc::now().trunc_subsecs(6),
        };

        self.backend
            .store_file_with_record(&record, content)
            .await
            .map_err(StoreError::from_backend)?;
        records.push(record.clone());

        info!(
            stored_id = %record.stored_id,
            file_size = record.file_size,
            "File stored"
        );
        Ok(record)
    }

    pub async fn get(&self, stored_id: &str) -> Result<FileRecord, StoreError> {
        let records = self.records.lock().await;
        find(&records, stored_id).cloned()
    }

    /// Every record in insertion order
    pub async fn list(&self) -> Vec<FileRecord> {
        self.records.lock().await.clone()
    }

    /// The record and the current stored bytes (which differ from the record
    /// after a tamper)
    pub async fn read_file(&self, stored_id: &str) -> Result<(FileRecord, Vec<u8>), StoreError> {
        let records = self.records.lock().await;
        let record = find(&records, stored_id)?.clone();
        let content = self
            .backend
            .read_file(stored_id)
            .await
            .map_err(StoreError::from_backend)?;
        Ok((record, content))
    }

    /// Remove one file and its record
    pub async fn delete(&self, stored_id: &str) -> Result<FileRecord, StoreError> {
        let mut records = self.records.lock().await;
        let index = records
            .iter()
            .position(|r| r.stored_id == stored_id)
            .ok_or_else(|| StoreError::NotFound(stored_id.to_string()))?;

        self.backend
            .delete_file_with_record(stored_id)
            .await
            .map_err(StoreError::from_backend)?;
        let removed = records.remove(index);

        info!(stored_id = %removed.stored_id, "File deleted");
        Ok(removed)
    }

    /// Remove every file and record. Returns how many records were removed.
    ///
    /// If the backend fails partway, the in-memory records are reloaded from
    /// what it persisted, so they never list records the backend already
    /// dropped.
    pub async fn reset(&self) -> Result<usize, StoreError> {
        let mut records = self.records.lock().await;
        let files_removed = match self.backend.clear().await {
            Ok(removed) => removed,
            Err(e) => {
                match self.backend.load_records().await {
                    Ok(persisted) => {
                        warn!(
                            remaining = persisted.len(),
                            "Reset failed partway, records reloaded"
                        );
                        *records = persisted;
                    }
                    Err(reload_err) => {
                        error!(error = %reload_err, "Failed to reload records after a failed reset")
                    }
                }
                return Err(StoreError::from_backend(e));
            }
        };
        let deleted = records.len();
        records.clear();

        info!(deleted, files_removed, "Store reset");
        Ok(deleted)
    }

    /// First inserted record with this content digest
    pub async fn find_by_digest(&self, digest: &str) -> Option<FileRecord> {
        let records = self.records.lock().await;
        records.iter().find(|r| r.content_digest == digest).cloned()
    }

    /// Every record uploaded under this filename, in insertion order
    pub async fn find_by_filename(&self, filename: &str) -> Vec<FileRecord> {
        let records = self.records.lock().await;
        records
            .iter()
            .filter(|r| r.original_filename == filename)
            .cloned()
            .collect()
    }

    /// Classify an incoming file against the stored records.
    ///
    /// The claimed name only feeds the filename stage. A name that would be
    /// refused on upload skips that stage instead of failing the request.
    pub async fn quick_verify(
        &self,
        content: &[u8],
        secret_key: &[u8],
        claimed_filename: &str,
    ) -> Result<MatchResult, StoreError> {
        let match_filename = match self.accept_filename(claimed_filename) {
            Ok(name) => Some(name),
            Err(e) => {
                debug!(error = %e, "Claimed filename skipped for matching");
                None
            }
        };
        let probe =
            Probe::new(content, secret_key, claimed_filename)?.match_filename(match_filename);

        let records = self.records.lock().await;
        let result = probe.match_against(&records, &self.config.tolerance)?;
        drop(records);

        info!(
            tier = ?result.tier(),
            status = ?result.status(),
            stored_id = ?result.record().map(|r| &r.stored_id),
            "Quick verification finished"
        );
        Ok(result)
    }

    /// Append [`TAMPER_MARKER`] to the stored bytes, leaving the record as is
    pub async fn tamper(&self, stored_id: &str) -> Result<TamperReport, StoreError> {
        let records = self.records.lock().await;
        find(&records, stored_id)?;

        let mut content = self
            .backend
            .read_file(stored_id)
            .await
            .map_err(StoreError::from_backend)?;
        let original_size = content.len() as u64;
        content.extend_from_slice(TAMPER_MARKER.as_bytes());

        self.backend
            .overwrite_file(stored_id, &content)
            .await
            .map_err(StoreError::from_backend)?;

        let report = TamperReport {
            original_size,
            tampered_size: content.len() as u64,
        };
        warn!(
            stored_id = %stored_id,
            original_size = report.original_size,
            tampered_size = report.tampered_size,
            "Stored file tampered"
        );
        Ok(report)
    }
}

fn find<'r>(records: &'r [FileRecord], stored_id: &str) -> Result<&'r FileRecord, StoreError> {
    records
        .iter()
        .find(|r| r.stored_id == stored_id)
        .ok_or_else(|| StoreError::NotFound(stored_id.to_string()))
}
