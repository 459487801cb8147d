//! Error handlers
//!
//! Logs errors at the request boundary and converts them to HTTP responses.
//! Callers only ever see a generic message; the underlying cause stays in the log.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use log::{error, warn};
use serde_json::json;

use crate::error::types::{AppError, IngestError, RemoteError, StorageError};

/// Log an error with its full cause chain
pub fn handle_error(err: &AppError) {
    let status = error_to_status(err);
    if status.is_server_error() {
        error!("Request failed ({}): {}", status.as_u16(), cause_chain(err));
    } else {
        warn!("Request rejected ({}): {}", status.as_u16(), err);
    }
}

/// `err` followed by each source whose text its message does not already carry
fn cause_chain(err: &AppError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Convert error to HTTP status code
pub fn error_to_status(err: &AppError) -> StatusCode {
    match err {
        AppError::Storage(e) => storage_status(e),
        AppError::Ingest(IngestError::Storage(e)) => storage_status(e),
        AppError::Ingest(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Remote(RemoteError::Unauthenticated) => StatusCode::UNAUTHORIZED,
        AppError::Remote(RemoteError::InvalidFolderId(_)) => StatusCode::BAD_REQUEST,
        AppError::Remote(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        AppError::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn storage_status(err: &StorageError) -> StatusCode {
    match err {
        StorageError::InvalidLocation(_) | StorageError::InvalidFilename(_) => {
            StatusCode::BAD_REQUEST
        }
        StorageError::FileNotFound(_) | StorageError::DirectoryNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        StorageError::FileAlreadyExists(_) => StatusCode::CONFLICT,
        StorageError::MoveFailed { .. }
        | StorageError::PartialFailure { .. }
        | StorageError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message safe to hand back to the client
pub fn public_message(err: &AppError) -> String {
    match err {
        AppError::Storage(e) | AppError::Ingest(IngestError::Storage(e)) => match e {
            StorageError::InvalidLocation(_) => "Invalid folder".into(),
            StorageError::InvalidFilename(_) => "Invalid file name".into(),
            StorageError::FileNotFound(_) => "File not found".into(),
            StorageError::DirectoryNotFound(_) => "Folder not found".into(),
            StorageError::FileAlreadyExists(_) => "File already exists in destination".into(),
            StorageError::MoveFailed { .. } => "Failed to move file".into(),
            StorageError::PartialFailure { .. } => "Some files could not be processed".into(),
            StorageError::IoError(_) => "Storage failure".into(),
        },
        AppError::Ingest(_) => "Failed to extract archive".into(),
        AppError::Remote(RemoteError::Unauthenticated) => "Not authenticated".into(),
        AppError::Remote(RemoteError::InvalidFolderId(_)) => "Invalid remote folder".into(),
        AppError::Remote(_) => "Failed to import from remote storage".into(),
        AppError::BadRequest(msg) => msg.clone(),
        AppError::PayloadTooLarge(_) => "Upload too large".into(),
        AppError::TaskFailed(_) => "Internal server error".into(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        handle_error(&self);
        let status = error_to_status(&self);
        let message = public_message(&self);

        let body = match &self {
            AppError::Storage(StorageError::PartialFailure { outcome, .. }) => json!({
                "error": message,
                "succeeded": outcome.succeeded,
                "failed": outcome.failed_names(),
            }),
            _ => json!({ "error": message }),
        };

        (status, Json(body)).into_response()
    }
}
