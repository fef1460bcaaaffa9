use actix_web::{get, HttpResponse};

/// Health check endpoint
#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(common::HealthResponse {
        status: "ok".to_string(),
    })
}
