use crate::constants::{QUICK_VERIFY_ENDPOINT, VERIFY_ENDPOINT};
use crate::http::ApiClient;
use anyhow::{Context, Result};
use common::{QuickVerifyResponse, VerifyResponse};
use std::path::Path;

/// Ask the server to check a file against an expected HMAC. Returns validity.
pub fn verify_remote(api: &ApiClient, path: &Path, secret_key: &str, hmac: &str) -> Result<bool> {
    let form = ApiClient::file_form(path)?
        .text("secret_key", secret_key.to_string())
        .text("hmac", hmac.to_string());
    let response = api.send(
        api.client().post(api.url(VERIFY_ENDPOINT)).multipart(form),
        "Verification",
    )?;
    let body: VerifyResponse = response.json().context("Invalid verify response")?;

    println!("{}", body.message);
    println!("  Provided HMAC:   {}", body.provided_hmac);
    println!("  Calculated HMAC: {}", body.calculated_hmac);
    println!("  File size:       {} bytes", body.file_size);
    Ok(body.is_valid)
}

/// Let the server find the matching stored file. Returns validity.
pub fn quick_verify(api: &ApiClient, path: &Path, secret_key: &str) -> Result<bool> {
    let form = ApiClient::file_form(path)?.text("secret_key", secret_key.to_string());
    let response = api.send(
        api.client()
            .post(api.url(QUICK_VERIFY_ENDPOINT))
            .multipart(form),
        "Quick verification",
    )?;
    let body: QuickVerifyResponse = response.json().context("Invalid quick-verify response")?;

    println!("{}", body.message);
    println!("  Tier:   {:?}", body.tier);
    println!("  Status: {:?}", body.status);
    if let Some(stored) = &body.stored_filename {
        println!("  Stored file: {}", stored);
    }
    if let Some(upload_time) = body.upload_time {
        println!("  Uploaded:    {}", upload_time.to_rfc3339());
    }
    if let Some(warning) = &body.warning {
        println!("  Warning: {}", warning);
    }
    if let Some(suggestion) = &body.suggestion {
        println!("  Suggestion: {}", suggestion);
    }
    Ok(body.is_valid)
}
