//! HTTP handlers
//!
//! Each handler validates its path parameters into a `Location` first, then
//! runs the blocking storage work on the blocking thread pool.

use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use log::debug;

use crate::api::responses::{Archived, Done, Emptied, FileList, FolderList, Imported};
use crate::error::{AppError, RemoteError};
use crate::ingest::{IntakeResult, Upload, intake};
use crate::remote::client::validate_remote_id;
use crate::remote::{Credential, import_remote_folder};
use crate::server::AppState;
use crate::storage::bundle::{bundle_location, bundle_name};
use crate::storage::validation::extension_of;
use crate::storage::{FolderStats, Location};

/// Multipart field that carries uploaded files
const UPLOAD_FIELD: &str = "file";

/// Runs `task` on the blocking pool and flattens its error into `AppError`
async fn run_blocking<T, E, F>(task: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Into<AppError> + Send + 'static,
{
    tokio::task::spawn_blocking(task).await?.map_err(Into::into)
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

fn credential(headers: &HeaderMap) -> Result<Credential, RemoteError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    Credential::from_authorization(value)
}

fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<IntakeResult>, AppError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let bytes = field.bytes().await.map_err(multipart_error)?;
        debug!("Received upload {:?} ({} bytes)", filename, bytes.len());
        uploads.push(Upload {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    if uploads.is_empty() {
        return Err(AppError::BadRequest("No file provided".into()));
    }

    let store = state.store.clone();
    let result = run_blocking(move || Ok::<_, AppError>(intake(&store, uploads))).await?;
    Ok(Json(result))
}

/// GET /images/{folder}
pub async fn list_images(
    State(state): State<AppState>,
    Path(folder): Path<String>,
) -> Result<Json<FileList>, AppError> {
    let location = Location::from_user(&folder)?;
    let store = state.store.clone();
    let files = run_blocking(move || store.list_files(location)).await?;
    Ok(Json(FileList { files }))
}

/// GET /uploads/{folder}/{filename}
pub async fn read_image(
    State(state): State<AppState>,
    Path((folder, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let location = Location::from_user(&folder)?;
    let content_type = content_type_for(&filename);
    let store = state.store.clone();
    let bytes = run_blocking(move || store.read_file(location, &filename)).await?;
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

/// DELETE /uploads/{folder}/{filename}
pub async fn delete_image(
    State(state): State<AppState>,
    Path((folder, filename)): Path<(String, String)>,
) -> Result<Json<Done>, AppError> {
    let location = Location::from_user(&folder)?;
    let store = state.store.clone();
    run_blocking(move || store.delete_file(location, &filename)).await?;
    Ok(Json(Done::ok()))
}

/// GET /folder-stats
pub async fn folder_stats(State(state): State<AppState>) -> Result<Json<FolderStats>, AppError> {
    let store = state.store.clone();
    let stats = run_blocking(move || store.stats()).await?;
    Ok(Json(stats))
}

/// POST /move/{filename}/{source}/{dest}
pub async fn move_image(
    State(state): State<AppState>,
    Path((filename, source, dest)): Path<(String, String, String)>,
) -> Result<Json<Done>, AppError> {
    let source = Location::from_user(&source)?;
    let dest = Location::from_user(&dest)?;
    let store = state.store.clone();
    run_blocking(move || store.move_file(&filename, source, dest)).await?;
    Ok(Json(Done::ok()))
}

/// POST /empty-folder/{folder}
pub async fn empty_folder(
    State(state): State<AppState>,
    Path(folder): Path<String>,
) -> Result<Json<Emptied>, AppError> {
    let location = Location::from_user(&folder)?;
    let store = state.store.clone();
    let outcome = run_blocking(move || store.delete_all_files(location)).await?;
    Ok(Json(Emptied {
        ok: true,
        removed: outcome.succeeded,
    }))
}

/// POST /archive-folder/{folder}
pub async fn archive_folder(
    State(state): State<AppState>,
    Path(folder): Path<String>,
) -> Result<Json<Archived>, AppError> {
    let location = Location::from_user(&folder)?;
    let store = state.store.clone();
    let outcome = run_blocking(move || store.archive_all_files(location)).await?;
    Ok(Json(Archived {
        ok: true,
        archived: outcome.succeeded,
    }))
}

/// GET /download-folder/{folder}
pub async fn download_folder(
    State(state): State<AppState>,
    Path(folder): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let location = Location::from_user(&folder)?;
    let store = state.store.clone();
    let bytes = run_blocking(move || bundle_location(&store, location)).await?;

    let disposition = format!("attachment; filename=\"{}\"", bundle_name(location));
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}

/// GET /remote/folders
pub async fn remote_folders(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<FolderList>, AppError> {
    let credential = credential(&headers)?;
    let folders = state.remote.list_folders(&credential).await?;
    Ok(Json(FolderList { folders }))
}

/// POST /remote/folders/{id}/import
pub async fn import_remote(
    State(state): State<AppState>,
    Path(folder_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Imported>, AppError> {
    let credential = credential(&headers)?;
    validate_remote_id(&folder_id)?;
    let outcome =
        import_remote_folder(&state.store, state.remote.as_ref(), &credential, &folder_id).await?;
    Ok(Json(Imported::from(outcome)))
}
