//! HTTP API
//!
//! Binds the sorting operations to axum routes.

pub mod handlers;
pub mod responses;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Router, middleware};

use crate::middleware::logging::log_requests;
use crate::server::AppState;

/// Builds the application router around `state`
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.upload.max_upload_size_bytes();

    Router::new()
        .route("/upload", post(handlers::upload))
        .route("/images/{folder}", get(handlers::list_images))
        .route(
            "/uploads/{folder}/{filename}",
            get(handlers::read_image).delete(handlers::delete_image),
        )
        .route("/folder-stats", get(handlers::folder_stats))
        .route("/move/{filename}/{source}/{dest}", post(handlers::move_image))
        .route("/empty-folder/{folder}", post(handlers::empty_folder))
        .route("/archive-folder/{folder}", post(handlers::archive_folder))
        .route("/download-folder/{folder}", get(handlers::download_folder))
        .route("/remote/folders", get(handlers::remote_folders))
        .route("/remote/folders/{id}/import", post(handlers::import_remote))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}
