use crate::constants::{DOWNLOAD_ENDPOINT, DOWNLOAD_HMAC_ENDPOINT};
use crate::http::ApiClient;
use anyhow::{Context, Result};
use common::{file_utils, hmac_file::HMAC_FILE_EXTENSION};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Download the current bytes of a stored file into `output_dir`
pub fn download_file(api: &ApiClient, stored_id: &str, output_dir: &Path) -> Result<PathBuf> {
    let response = api.send(
        api.client().get(api.url_for(DOWNLOAD_ENDPOINT, stored_id)),
        "Download",
    )?;
    let content = response.bytes().context("Failed to read download")?;

    let target = output_path(output_dir, stored_id)?;
    write_output(&target, &content)?;

    info!("Downloaded {} ({} bytes)", stored_id, content.len());
    println!("Downloaded {} to {}", stored_id, target.display());
    Ok(target)
}

/// Download the `.hmac` document of a stored file into `output_dir`
pub fn download_hmac(api: &ApiClient, stored_id: &str, output_dir: &Path) -> Result<PathBuf> {
    let response = api.send(
        api.client().get(api.url_for(DOWNLOAD_HMAC_ENDPOINT, stored_id)),
        "HMAC download",
    )?;
    let document = response.text().context("Failed to read HMAC document")?;

    let target = output_path(output_dir, &format!("{}.{}", stored_id, HMAC_FILE_EXTENSION))?;
    write_output(&target, document.as_bytes())?;

    print!("{}", document);
    println!("Saved to {}", target.display());
    Ok(target)
}

/// Stored ids come from the server; refuse anything that would escape the output directory
fn output_path(output_dir: &Path, filename: &str) -> Result<PathBuf> {
    file_utils::validate_filename(filename)
        .map_err(|e| anyhow::anyhow!("{}: {}", e.message(), filename))?;
    Ok(output_dir.join(filename))
}

fn write_output(target: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    fs::write(target, content).with_context(|| format!("Failed to write {:?}", target))
}
