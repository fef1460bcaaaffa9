//! Plain-text `.hmac` documents exchanged between the server and the CLI
//!
//! ```text
//! File: notes.txt
//! HMAC: q2h1...=
//! Upload Time: 2024-05-01T10:00:00+00:00
//! File Size: 42 bytes
//! ```

use crate::FileRecord;
use std::collections::BTreeMap;

/// Extension appended to a stored id (or local path) for its HMAC document
pub const HMAC_FILE_EXTENSION: &str = "hmac";

const HMAC_LINE_PREFIX: &str = "HMAC:";

/// Parsed `.hmac` document: the HMAC value plus any informational fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HmacDocument {
    pub hmac: String,
    pub fields: BTreeMap<String, String>,
}

/// Render the HMAC document for a stored record
pub fn render(record: &FileRecord) -> String {
    format!(
        "File: {}\nHMAC: {}\nUpload Time: {}\nFile Size: {} bytes\n",
        record.original_filename,
        record.hmac,
        record.upload_time.to_rfc3339(),
        record.file_size
    )
}

/// Render an HMAC document for a local file that was never uploaded
pub fn render_local(filename: &str, hmac: &str, file_size: u64) -> String {
    format!(
        "File: {}\nHMAC: {}\nFile Size: {} bytes\n",
        filename, hmac, file_size
    )
}

/// Parse an HMAC document. Returns `None` when no `HMAC:` line is present.
pub fn parse(content: &str) -> Option<HmacDocument> {
    let mut hmac = None;
    let mut fields = BTreeMap::new();

    for line in content.lines() {
        if let Some(value) = line.strip_prefix(HMAC_LINE_PREFIX) {
            hmac = Some(value.trim().to_string());
        } else if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    hmac.filter(|h| !h.is_empty())
        .map(|hmac| HmacDocument { hmac, fields })
}
