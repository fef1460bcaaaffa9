pub mod backend;
pub mod database;
pub mod error;
pub mod filesystem;
pub mod store;

use anyhow::Result;
use async_trait::async_trait;
use common::FileRecord;

pub use backend::StorageBackend;
pub use database::DatabaseRetryConfig;
pub use error::StoreError;
pub use store::{RecordStore, StoreConfig, TamperReport, TAMPER_MARKER};

/// Persistence backend for file bytes and their records.
///
/// Backends are not synchronised themselves: the [`RecordStore`] serialises
/// every call through its store-wide lock.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Load every persisted record in insertion order
    async fn load_records(&self) -> Result<Vec<FileRecord>>;

    /// Store a file and append its record atomically
    /// For database: uses a transaction
    /// For filesystem: writes the file, then the record list (temp file + fsync + rename),
    /// removing the file again if the record list cannot be written
    async fn store_file_with_record(&self, record: &FileRecord, content: &[u8]) -> Result<()>;

    /// Read the current bytes of a stored file
    async fn read_file(&self, stored_id: &str) -> Result<Vec<u8>>;

    /// Replace the bytes of a stored file, leaving its record untouched
    async fn overwrite_file(&self, stored_id: &str, content: &[u8]) -> Result<()>;

    /// Remove a file and its record atomically
    async fn delete_file_with_record(&self, stored_id: &str) -> Result<()>;

    /// Remove every file and record. Returns the number of stored files removed.
    async fn clear(&self) -> Result<usize>;

    /// Remove stored files no record refers to. Returns how many were removed.
    async fn sweep_orphans(&self) -> Result<usize> {
        Ok(0)
    }
}
