use crate::handlers::error::{handle_store_error, ApiError};
use crate::handlers::upload_form::{required_text, UploadForm, UploadedFile};
use crate::state::AppState;
use actix_multipart::form::MultipartForm;
use actix_web::{get, post, web, HttpResponse};
use common::{FileListResponse, FileSummary, UploadResponse};
use tracing::info;

/// Handle file upload (multipart/form-data)
#[post("/upload")]
pub async fn upload(
    MultipartForm(form): MultipartForm<UploadForm>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    // The whole body is received before anything reaches the store
    let file = UploadedFile::read(form.file).await?;
    let secret_key = required_text(form.secret_key, "Secret key is required")?;

    info!(
        filename = ?file.filename,
        file_size = file.content.len(),
        "POST /api/upload - Request received"
    );

    let record = state
        .store
        .insert(&file.filename, &file.content, secret_key.as_bytes())
        .await
        .map_err(|e| handle_store_error("POST /api/upload - Failed to store file", e))?;

    Ok(HttpResponse::Ok().json(UploadResponse {
        success: true,
        message: format!("File \"{}\" uploaded successfully", record.original_filename),
        file: FileSummary::from(&record),
    }))
}

/// List every stored file in upload order
#[get("/files")]
pub async fn list_files(state: web::Data<AppState>) -> HttpResponse {
    let files: Vec<FileSummary> = state.store.list().await.iter().map(FileSummary::from).collect();
    info!(count = files.len(), "GET /api/files");

    HttpResponse::Ok().json(FileListResponse {
        success: true,
        files,
    })
}
