use crate::constants::{FILES_ENDPOINT, UPLOAD_ENDPOINT};
use crate::http::ApiClient;
use anyhow::{Context, Result};
use common::{FileListResponse, FileSummary, UploadResponse};
use log::info;
use std::path::PathBuf;

/// Upload each file under the same secret key, in the order given
pub fn upload_files(api: &ApiClient, files: &[PathBuf], secret_key: &str) -> Result<Vec<FileSummary>> {
    if files.is_empty() {
        anyhow::bail!("No files to upload");
    }

    let mut uploaded = Vec::with_capacity(files.len());
    for path in files {
        let form = ApiClient::file_form(path)?.text("secret_key", secret_key.to_string());
        let response = api.send(
            api.client().post(api.url(UPLOAD_ENDPOINT)).multipart(form),
            &format!("Upload of {}", path.display()),
        )?;
        let body: UploadResponse = response.json().context("Invalid upload response")?;

        info!("Uploaded {} as {}", path.display(), body.file.filename);
        println!("Uploaded: {}", path.display());
        println!("  Stored ID: {}", body.file.filename);
        println!("  HMAC:      {}", body.file.hmac);
        println!("  Size:      {} bytes", body.file.file_size);
        uploaded.push(body.file);
    }

    Ok(uploaded)
}

/// Print every stored file
pub fn list_files(api: &ApiClient) -> Result<Vec<FileSummary>> {
    let response = api.send(api.client().get(api.url(FILES_ENDPOINT)), "Listing files")?;
    let body: FileListResponse = response.json().context("Invalid file list response")?;

    if body.files.is_empty() {
        println!("No files stored.");
    }
    for file in &body.files {
        println!(
            "{}  {}  {} bytes  {}",
            file.filename,
            file.original_filename,
            file.file_size,
            file.upload_time.to_rfc3339()
        );
    }
    Ok(body.files)
}
