mod config;
mod constants;
mod handlers;
mod state;

use actix_multipart::form::MultipartFormConfig;
use actix_web::{web, App, HttpServer};
use config::{ServerConfig, StorageType};
use constants::MULTIPART_MEMORY_LIMIT;
use handlers::error::handle_rejected;
use state::AppState;
use std::sync::Arc;
use storage::RecordStore;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing with env filter
    // Filter out actix-server worker shutdown messages
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("info")
                    .add_directive("actix_server::worker=warn".parse().unwrap())
                    .add_directive("actix_server::accept=warn".parse().unwrap())
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    info!(
        "Starting file integrity server (PID: {})",
        std::process::id()
    );

    let config = ServerConfig::load().map_err(|e| {
        error!("Invalid configuration: {}", e);
        e
    })?;

    match config.storage_type {
        StorageType::Database => info!(
            "Using database storage (max_attempts={}, initial_delay_seconds={})",
            config.database_retry_config.max_attempts,
            config.database_retry_config.initial_delay_seconds
        ),
        StorageType::Filesystem => info!("Using filesystem storage: {:?}", config.data_dir),
    }

    let backend = config.storage_backend().initialize().await.map_err(|e| {
        error!("Failed to initialize storage: {:#}", e);
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to initialize storage: {:#}", e),
        )
    })?;

    let store = RecordStore::open(backend, config.store.clone())
        .await
        .map_err(|e| {
            error!("Failed to load records: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?;
    info!(
        tolerance_percent = config.store.tolerance.percent,
        min_tolerance_bytes = config.store.tolerance.min_bytes,
        allowed_extensions = ?config.store.allowed_extensions,
        "Record store ready"
    );

    let state = web::Data::new(AppState::new(Arc::new(store)));
    let max_upload_bytes = config.max_upload_bytes;
    let bind_address = config.bind_address();

    info!("Starting server on http://{}", bind_address);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(max_upload_bytes)
                    .memory_limit(MULTIPART_MEMORY_LIMIT)
                    .error_handler(|err, _req| handle_rejected("Invalid upload", err)),
            )
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .map_err(|e| {
        error!("Failed to bind to {}: {}", bind_address, e);
        e
    })?;

    info!("Server bound successfully to http://{}", bind_address);

    server.run().await
}
