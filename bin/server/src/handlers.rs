//! HTTP request handlers

pub mod download;
pub mod error;
pub mod health;
pub mod manage;
pub mod upload;
pub mod upload_form;
pub mod verify;

use actix_web::web;

/// Register every route; the API lives under `/api`, the health check at the root
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health::health).service(
        web::scope("/api")
            .service(upload::upload)
            .service(upload::list_files)
            .service(verify::verify)
            .service(verify::quick_verify)
            .service(download::download)
            .service(download::download_hmac)
            .service(manage::simulate_tamper)
            .service(manage::delete_file)
            .service(manage::reset_all),
    );
}
