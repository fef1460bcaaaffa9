//! Offline HMAC generation and checking; no server involved

use anyhow::{Context, Result};
use common::hmac_file::{self, HMAC_FILE_EXTENSION};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Where the HMAC document of `path` is written by default
pub fn hmac_file_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(HMAC_FILE_EXTENSION);
    PathBuf::from(name)
}

/// Compute the HMAC of a file, optionally writing a `.hmac` document next to it
pub fn generate(path: &Path, secret_key: &str, save: bool) -> Result<String> {
    let content = fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let hmac = crypto::authenticate(&content, secret_key.as_bytes())?;

    println!("File: {}", path.display());
    println!("File Size: {} bytes", content.len());
    println!("HMAC-SHA256: {}", hmac);

    if save {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let document = hmac_file::render_local(&filename, &hmac, content.len() as u64);
        let target = hmac_file_path(path);
        fs::write(&target, document)
            .with_context(|| format!("Failed to write HMAC file: {:?}", target))?;
        info!("HMAC saved to {}", target.display());
        println!("HMAC saved to: {}", target.display());
    }

    Ok(hmac)
}

/// Read the expected HMAC from a `.hmac` document
pub fn read_hmac_file(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read HMAC file: {:?}", path))?;
    let document = hmac_file::parse(&content)
        .with_context(|| format!("No HMAC line found in {:?}", path))?;
    Ok(document.hmac)
}

/// Check a file against an expected HMAC. Returns whether it matched.
pub fn check(path: &Path, secret_key: &str, expected_hmac: &str) -> Result<bool> {
    let content = fs::read(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    let is_valid = crypto::verify(&content, secret_key.as_bytes(), expected_hmac)?;

    println!("File: {}", path.display());
    println!("Expected HMAC:   {}", expected_hmac.trim());
    println!(
        "Calculated HMAC: {}",
        crypto::authenticate(&content, secret_key.as_bytes())?
    );
    if is_valid {
        println!("File integrity verified: the file has not been modified.");
    } else {
        println!("File integrity check FAILED: the file or the key does not match.");
    }
    Ok(is_valid)
}
