use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use common::ErrorResponse;
use storage::StoreError;
use thiserror::Error;
use tracing::{error, warn};

/// Every failure a handler can return; rendered as a JSON [`ErrorResponse`]
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Store(#[from] StoreError),
    /// Request body rejected before reaching a handler (e.g. too large)
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(e) => match e {
                StoreError::Validation(_) | StoreError::InvalidKey(_) => StatusCode::BAD_REQUEST,
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::StorageFull(_) => StatusCode::INSUFFICIENT_STORAGE,
                StoreError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Rejected { status, .. } => *status,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            success: false,
            error: self.to_string(),
        })
    }
}

/// Helper function for bad request errors
pub fn handle_error(msg: &str) -> ApiError {
    warn!("{}", msg);
    ApiError::BadRequest(msg.to_string())
}

/// Log a store failure at a level matching its severity and wrap it
pub fn handle_store_error(msg: &str, e: StoreError) -> ApiError {
    let err = ApiError::from(e);
    if err.status_code().is_server_error() {
        error!("{}: {}", msg, err);
    } else {
        warn!("{}: {}", msg, err);
    }
    err
}

/// Map an extractor failure (multipart parsing, payload limits) to a JSON error
pub fn handle_rejected<E: ResponseError>(msg: &str, e: E) -> actix_web::Error {
    let status = e.status_code();
    warn!("{}: {}", msg, e);
    ApiError::Rejected {
        status,
        message: format!("{}: {}", msg, e),
    }
    .into()
}
