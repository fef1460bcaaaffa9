use crate::handlers::error::{handle_error, ApiError};
use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};

/// Fields are optional so a missing one gets a specific message instead of a
/// generic multipart error. The request size cap is set on the
/// `MultipartFormConfig` registered in `main`.
#[derive(MultipartForm)]
pub struct UploadForm {
    /// The file being uploaded
    pub file: Option<TempFile>,

    /// Key the HMAC is computed with; never stored
    pub secret_key: Option<Text<String>>,
}

/// Multipart form for verification against an expected HMAC
#[derive(MultipartForm)]
pub struct VerifyForm {
    pub file: Option<TempFile>,
    pub secret_key: Option<Text<String>>,

    /// Base64 HMAC the file is expected to have
    pub hmac: Option<Text<String>>,
}

/// A received file, fully read from its temp file
#[derive(Debug)]
pub struct UploadedFile {
    /// Name as sent by the client, not yet sanitized
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub async fn read(file: Option<TempFile>) -> Result<Self, ApiError> {
        let file = file.ok_or_else(|| handle_error("No file provided"))?;
        let filename = file
            .file_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| handle_error("No file selected"))?;

        let content = tokio::fs::read(file.file.path())
            .await
            .map_err(|e| handle_error(&format!("Failed to read uploaded file: {}", e)))?;

        Ok(Self { filename, content })
    }
}

/// Extract a required text field, treating blank values as missing
pub fn required_text(field: Option<Text<String>>, missing: &str) -> Result<String, ApiError> {
    field
        .map(|text| text.into_inner())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| handle_error(missing))
}
