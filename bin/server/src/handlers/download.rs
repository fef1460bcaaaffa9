use crate::handlers::error::{handle_store_error, ApiError};
use crate::state::AppState;
use actix_web::{
    get,
    http::header::{ContentDisposition, ContentType},
    web, HttpResponse,
};
use common::hmac_file::{self, HMAC_FILE_EXTENSION};
use tracing::info;

/// Download the current bytes of a stored file under its original name
#[get("/download/{stored_id}")]
pub async fn download(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let stored_id = path.into_inner();
    info!(stored_id = ?stored_id, "GET /api/download - Request received");

    let (record, content) = state
        .store
        .read_file(&stored_id)
        .await
        .map_err(|e| handle_store_error("GET /api/download - Failed to read file", e))?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::octet_stream())
        .insert_header(ContentDisposition::attachment(record.original_filename))
        .body(content))
}

/// Download the `.hmac` document of a stored file, rendered from its record
#[get("/download-hmac/{stored_id}")]
pub async fn download_hmac(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let stored_id = path.into_inner();
    info!(stored_id = ?stored_id, "GET /api/download-hmac - Request received");

    let record = state
        .store
        .get(&stored_id)
        .await
        .map_err(|e| handle_store_error("GET /api/download-hmac - Unknown file", e))?;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::plaintext())
        .insert_header(ContentDisposition::attachment(format!(
            "{}.{}",
            record.stored_id, HMAC_FILE_EXTENSION
        )))
        .body(hmac_file::render(&record)))
}
