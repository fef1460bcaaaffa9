use crate::constants::{DELETE_ENDPOINT, RESET_ENDPOINT, TAMPER_ENDPOINT};
use crate::http::ApiClient;
use anyhow::{Context, Result};
use common::{DeleteResponse, ResetResponse, TamperResponse};
use log::{info, warn};

pub fn tamper(api: &ApiClient, stored_id: &str) -> Result<TamperResponse> {
    let response = api.send(
        api.client().post(api.url_for(TAMPER_ENDPOINT, stored_id)),
        "Tamper simulation",
    )?;
    let body: TamperResponse = response.json().context("Invalid tamper response")?;

    warn!("Tampered with {}", stored_id);
    println!(
        "{} ({} -> {} bytes)",
        body.message, body.original_size, body.tampered_size
    );
    Ok(body)
}

pub fn delete(api: &ApiClient, stored_id: &str) -> Result<DeleteResponse> {
    let response = api.send(
        api.client().delete(api.url_for(DELETE_ENDPOINT, stored_id)),
        "Delete",
    )?;
    let body: DeleteResponse = response.json().context("Invalid delete response")?;

    info!("Deleted {}", body.deleted_filename);
    println!("{}", body.message);
    Ok(body)
}

pub fn reset(api: &ApiClient) -> Result<ResetResponse> {
    let response = api.send(api.client().post(api.url(RESET_ENDPOINT)), "Reset")?;
    let body: ResetResponse = response.json().context("Invalid reset response")?;

    info!("Reset removed {} files", body.deleted_count);
    println!("{}", body.message);
    Ok(body)
}
