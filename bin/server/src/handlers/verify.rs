use crate::handlers::error::{handle_error, handle_store_error, ApiError};
use crate::handlers::upload_form::{required_text, UploadForm, UploadedFile, VerifyForm};
use crate::state::AppState;
use actix_multipart::form::MultipartForm;
use actix_web::{post, web, HttpResponse};
use common::{QuickVerifyResponse, VerifyResponse};
use quick_match::MatchResult;
use tracing::info;

/// Verify a file against an HMAC supplied by the caller; the store is not consulted
#[post("/verify")]
pub async fn verify(MultipartForm(form): MultipartForm<VerifyForm>) -> Result<HttpResponse, ApiError> {
    let file = UploadedFile::read(form.file).await?;
    let secret_key = required_text(form.secret_key, "Secret key is required")?;
    let provided_hmac = required_text(form.hmac, "HMAC value is required")?;

    let calculated_hmac = crypto::authenticate(&file.content, secret_key.as_bytes())
        .map_err(|e| handle_error(&e.to_string()))?;
    let is_valid = crypto::verify(&file.content, secret_key.as_bytes(), &provided_hmac)
        .map_err(|e| handle_error(&e.to_string()))?;

    info!(
        filename = ?file.filename,
        is_valid,
        "POST /api/verify - Verification finished"
    );

    Ok(HttpResponse::Ok().json(VerifyResponse {
        success: true,
        is_valid,
        message: if is_valid {
            "File integrity verified".to_string()
        } else {
            "File integrity check failed".to_string()
        },
        provided_hmac: provided_hmac.trim().to_string(),
        calculated_hmac,
        file_size: file.content.len() as u64,
    }))
}

/// Find the stored record a file corresponds to and classify the match
#[post("/quick-verify")]
pub async fn quick_verify(
    MultipartForm(form): MultipartForm<UploadForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let file = UploadedFile::read(form.file).await?;
    let secret_key = required_text(form.secret_key, "Secret key is required")?;

    let result = state
        .store
        .quick_verify(&file.content, secret_key.as_bytes(), &file.filename)
        .await
        .map_err(|e| handle_store_error("POST /api/quick-verify - Failed", e))?;

    Ok(HttpResponse::Ok().json(to_response(&result)))
}

fn to_response(result: &MatchResult) -> QuickVerifyResponse {
    let record = result.record();
    QuickVerifyResponse {
        success: true,
        match_found: result.match_found(),
        tier: result.tier(),
        status: result.status(),
        is_valid: result.is_valid(),
        message: result.message(),
        warning: result.warning(),
        suggestion: result.suggestion(),
        calculated_hmac: result.calculated_hmac.clone(),
        file_size: result.file_size,
        stored_filename: record.map(|r| r.stored_id.clone()),
        original_filename: record.map(|r| r.original_filename.clone()),
        upload_time: record.map(|r| r.upload_time),
        stored_hmac: record.map(|r| r.hmac.clone()),
        stored_file_size: record.map(|r| r.file_size),
    }
}
