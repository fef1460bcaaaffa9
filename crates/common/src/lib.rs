pub mod file_utils;
pub mod hmac_file;
pub mod record;

pub use record::FileRecord;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quick-verify classification, strongest signal first
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// Byte-identical content is stored
    Content,
    /// A record with the same filename exists, content differs
    FilenameOnly,
    /// Size heuristic only, no name or content match
    PossiblyModified,
    None,
}

/// Finer-grained quick-verify outcome shown to the caller
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    /// Content and key both confirmed
    Verified,
    /// Content identical, but the key does not reproduce the stored HMAC
    KeyMismatch,
    /// Same filename, different content
    ContentDiffers,
    PossiblyModified,
    NotFound,
}

/// Error body returned by every failing endpoint
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub success: bool, // always false
    pub error: String,
}

/// Summary of a stored file as listed by the API
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct FileSummary {
    pub filename: String, // stored id
    pub original_filename: String,
    pub hmac: String,
    pub content_digest: String,
    pub upload_time: DateTime<Utc>,
    pub file_size: u64,
}

impl From<&FileRecord> for FileSummary {
    fn from(record: &FileRecord) -> Self {
        Self {
            filename: record.stored_id.clone(),
            original_filename: record.original_filename.clone(),
            hmac: record.hmac.clone(),
            content_digest: record.content_digest.clone(),
            upload_time: record.upload_time,
            file_size: record.file_size,
        }
    }
}

/// Response to a successful upload
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub file: FileSummary,
}

/// Response listing every stored file in upload order
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FileListResponse {
    pub success: bool,
    pub files: Vec<FileSummary>,
}

/// Response to a direct (expected-HMAC) verification
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct VerifyResponse {
    pub success: bool,
    pub is_valid: bool,
    pub message: String,
    pub provided_hmac: String,
    pub calculated_hmac: String,
    pub file_size: u64,
}

/// Response to a quick verification against the stored records
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QuickVerifyResponse {
    pub success: bool,
    pub match_found: bool,
    pub tier: MatchTier,
    pub status: MatchStatus,
    pub is_valid: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    pub calculated_hmac: String,
    pub file_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_hmac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_file_size: Option<u64>,
}

/// Response to a tamper simulation
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TamperResponse {
    pub success: bool,
    pub message: String,
    pub original_size: u64,
    pub tampered_size: u64,
}

/// Response to deleting one stored file
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub deleted_filename: String,
}

/// Response to resetting the whole store
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
    pub deleted_count: usize,
}

/// Response from health check endpoint
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String, // "ok" when healthy
}
