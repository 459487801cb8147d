//! Error types
//!
//! Defines domain-specific error types for each module of the image sorter.

use std::io;

use thiserror::Error;

use crate::storage::BatchOutcome;

/// Storage module errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("File already exists: {0}")]
    FileAlreadyExists(String),

    #[error("Failed to move {filename}: {source}")]
    MoveFailed {
        filename: String,
        #[source]
        source: io::Error,
    },

    #[error("Partial failure in {location}: {} item(s) failed", .outcome.failed.len())]
    PartialFailure {
        location: String,
        outcome: BatchOutcome,
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Archive ingest errors
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid archive: {0}")]
    InvalidArchive(#[from] zip::result::ZipError),

    #[error("IO error during ingest: {0}")]
    IoError(#[from] io::Error),

    #[error("Storage error during ingest: {0}")]
    Storage(#[from] StorageError),
}

/// Remote import errors
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Remote storage credential missing or rejected")]
    Unauthenticated,

    #[error("Invalid remote folder id: {0}")]
    InvalidFolderId(String),

    #[error("Remote request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Remote storage returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

/// Server startup and shutdown errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Storage layout unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("Remote client setup failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("Server IO error: {0}")]
    IoError(#[from] io::Error),
}

/// General error that encompasses all error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        AppError::TaskFailed(error.to_string())
    }
}
