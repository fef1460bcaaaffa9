use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata persisted for one uploaded file.
///
/// `content_digest` and `hmac` describe the bytes as they were at upload time
/// and are never recomputed, even if the stored bytes are later modified.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    /// Unique handle, also the on-disk filename of the stored bytes
    pub stored_id: String,
    pub original_filename: String,
    /// Hex-encoded SHA256 of the uploaded bytes
    pub content_digest: String,
    /// Base64-encoded HMAC-SHA256 of the uploaded bytes
    pub hmac: String,
    pub file_size: u64,
    pub upload_time: DateTime<Utc>,
}

impl FileRecord {
    /// Whether this record is more recent than `other` by upload time
    pub fn is_newer_than(&self, other: &FileRecord) -> bool {
        self.upload_time > other.upload_time
    }
}
