use crate::handlers::error::{handle_store_error, ApiError};
use crate::state::AppState;
use actix_web::{delete, post, web, HttpResponse};
use common::{DeleteResponse, ResetResponse, TamperResponse};
use tracing::info;

/// Append a tamper marker to a stored file without touching its record
#[post("/simulate-tamper/{stored_id}")]
pub async fn simulate_tamper(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let stored_id = path.into_inner();

    let report = state
        .store
        .tamper(&stored_id)
        .await
        .map_err(|e| handle_store_error("POST /api/simulate-tamper - Failed", e))?;

    Ok(HttpResponse::Ok().json(TamperResponse {
        success: true,
        message: "File has been tampered with for demonstration purposes".to_string(),
        original_size: report.original_size,
        tampered_size: report.tampered_size,
    }))
}

#[delete("/delete/{stored_id}")]
pub async fn delete_file(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let stored_id = path.into_inner();

    let removed = state
        .store
        .delete(&stored_id)
        .await
        .map_err(|e| handle_store_error("DELETE /api/delete - Failed", e))?;

    Ok(HttpResponse::Ok().json(DeleteResponse {
        success: true,
        message: format!("File \"{}\" deleted successfully", removed.original_filename),
        deleted_filename: removed.stored_id,
    }))
}

/// Remove every stored file and record
#[post("/reset-all")]
pub async fn reset_all(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let deleted_count = state
        .store
        .reset()
        .await
        .map_err(|e| handle_store_error("POST /api/reset-all - Failed", e))?;

    info!(deleted_count, "POST /api/reset-all - Store cleared");

    Ok(HttpResponse::Ok().json(ResetResponse {
        success: true,
        message: format!(
            "All files reset successfully. Deleted {} files.",
            deleted_count
        ),
        deleted_count,
    }))
}
