use common::file_utils::FilenameValidationError;
use crypto::CryptoError;
use std::io::ErrorKind;
use thiserror::Error;

/// Errors reported by the record store.
///
/// A failed verification is not an error; these are only the cases where an
/// operation could not be carried out.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidKey(#[from] CryptoError),
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Storage is full: {0:#}")]
    StorageFull(anyhow::Error),
    #[error("Storage I/O failed: {0:#}")]
    Io(anyhow::Error),
}

impl StoreError {
    /// Classify a backend failure, surfacing out-of-space conditions separately
    pub fn from_backend(err: anyhow::Error) -> Self {
        if is_storage_full(&err) {
            StoreError::StorageFull(err)
        } else {
            StoreError::Io(err)
        }
    }
}

impl From<FilenameValidationError> for StoreError {
    fn from(err: FilenameValidationError) -> Self {
        StoreError::Validation(err.message())
    }
}

fn is_storage_full(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == ErrorKind::StorageFull)
    })
}
