//! Storage operations
//!
//! The file state store: list, count, move, delete, empty and archive files
//! within the catalog locations. Every query reads the directory; nothing is
//! cached.

use chrono::{DateTime, Local};
use log::{error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::StorageConfig;
use crate::error::StorageError;
use crate::storage::catalog::Location;
use crate::storage::filesystem::{
    create_directory, directory_exists, file_exists, relocate, unique_destination, write_atomic,
};
use crate::storage::results::{BatchOutcome, FolderStats};
use crate::storage::validation::{is_media, sanitize_filename};

/// Sortable, second-granularity prefix used when archiving
const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

const ARCHIVE_NAME_ATTEMPTS: usize = 8;

#[derive(Debug, Clone)]
pub struct FileStore {
    config: Arc<StorageConfig>,
}

impl FileStore {
    pub fn new(config: Arc<StorageConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn location_path(&self, location: Location) -> PathBuf {
        location.resolve(&self.config.root)
    }

    /// Creates the storage root and every catalog location
    pub fn ensure_layout(&self) -> Result<(), StorageError> {
        for location in Location::all() {
            let path = self.location_path(location);
            if !directory_exists(&path) {
                create_directory(&path)?;
                info!("Created storage folder {} (real: {})", location, path.display());
            }
        }
        Ok(())
    }

    /// Existing directory for `location`, or `DirectoryNotFound`
    fn existing_dir(&self, location: Location) -> Result<PathBuf, StorageError> {
        let path = self.location_path(location);
        if directory_exists(&path) {
            Ok(path)
        } else {
            Err(StorageError::DirectoryNotFound(location.name()))
        }
    }

    /// Checks a client-supplied filename before it is joined onto a location path.
    ///
    /// Only names that could leave the location are refused, so every file
    /// `iter_files` yields can also be moved, read and deleted.
    fn checked_name(&self, filename: &str) -> Result<(), StorageError> {
        let escapes = filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\', '\0']);
        if escapes || !is_media(filename, &self.config) {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }
        Ok(())
    }

    /// Lazily yields the media files in `location`.
    ///
    /// Directory order, not sorted. Subdirectories, non-media files and
    /// transient intake files are skipped. Call again to restart.
    pub fn iter_files(
        &self,
        location: Location,
    ) -> Result<impl Iterator<Item = String> + '_, StorageError> {
        let path = self.existing_dir(location)?;
        let entries = fs::read_dir(&path).map_err(|e| {
            error!("Failed to list {} (real: {}): {}", location, path.display(), e);
            StorageError::from(e)
        })?;

        Ok(entries.flatten().filter_map(move |entry| {
            let is_file = entry.file_type().is_ok_and(|t| t.is_file());
            let name = entry.file_name().into_string().ok()?;
            (is_file && is_media(&name, &self.config)).then_some(name)
        }))
    }

    /// Lists the media files in `location`
    pub fn list_files(&self, location: Location) -> Result<Vec<String>, StorageError> {
        let files: Vec<String> = self.iter_files(location)?.collect();
        info!("Listed {} - {} files", location, files.len());
        Ok(files)
    }

    /// Number of media files in `location`
    pub fn count(&self, location: Location) -> Result<usize, StorageError> {
        Ok(self.iter_files(location)?.count())
    }

    /// Media file count of every user-selectable location
    pub fn stats(&self) -> Result<FolderStats, StorageError> {
        Location::user_selectable()
            .map(|location| -> Result<_, StorageError> {
                Ok((location.name(), self.count(location)?))
            })
            .collect()
    }

    /// Moves `filename` from `source` to `dest`.
    ///
    /// Fails with `FileAlreadyExists` rather than overwrite a file in `dest`.
    pub fn move_file(
        &self,
        filename: &str,
        source: Location,
        dest: Location,
    ) -> Result<(), StorageError> {
        self.checked_name(filename)?;
        let source_dir = self.existing_dir(source)?;
        let dest_dir = self.existing_dir(dest)?;

        let source_path = source_dir.join(filename);
        let dest_path = dest_dir.join(filename);
        let virtual_source = format!("{source}/{filename}");

        if !file_exists(&source_path) {
            return Err(StorageError::FileNotFound(virtual_source));
        }

        if source == dest {
            return Ok(());
        }

        if fs::symlink_metadata(&dest_path).is_ok() {
            return Err(StorageError::FileAlreadyExists(format!("{dest}/{filename}")));
        }

        relocate(&source_path, &dest_path).map_err(|e| {
            // Lost a race with another move of the same file
            if e.kind() == io::ErrorKind::NotFound {
                return StorageError::FileNotFound(virtual_source.clone());
            }
            if e.kind() == io::ErrorKind::AlreadyExists {
                return StorageError::FileAlreadyExists(format!("{dest}/{filename}"));
            }
            error!(
                "Failed to move {} to {} (real: {} -> {}): {}",
                virtual_source,
                dest,
                source_path.display(),
                dest_path.display(),
                e
            );
            StorageError::MoveFailed {
                filename: filename.to_string(),
                source: e,
            }
        })?;

        info!("Moved {} to {}", virtual_source, dest);
        Ok(())
    }

    /// Deletes a single file
    pub fn delete_file(&self, location: Location, filename: &str) -> Result<(), StorageError> {
        self.checked_name(filename)?;
        let path = self.existing_dir(location)?.join(filename);
        let virtual_path = format!("{location}/{filename}");

        if !file_exists(&path) {
            return Err(StorageError::FileNotFound(virtual_path));
        }

        fs::remove_file(&path).map_err(|e| {
            error!("Failed to delete {} (real: {}): {}", virtual_path, path.display(), e);
            StorageError::from(e)
        })?;

        info!("Deleted {}", virtual_path);
        Ok(())
    }

    /// Removes every regular file in `location`; subdirectories are left alone.
    ///
    /// Each removal is attempted independently. Any failure turns the whole
    /// call into `PartialFailure` carrying the per-file outcome.
    pub fn delete_all_files(&self, location: Location) -> Result<BatchOutcome, StorageError> {
        self.delete_all_with(location, |path| fs::remove_file(path))
    }

    fn delete_all_with<F>(
        &self,
        location: Location,
        mut remove: F,
    ) -> Result<BatchOutcome, StorageError>
    where
        F: FnMut(&Path) -> io::Result<()>,
    {
        let dir = self.existing_dir(location)?;
        let mut outcome = BatchOutcome::default();

        for entry in fs::read_dir(&dir)?.flatten() {
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            match remove(&entry.path()) {
                Ok(()) => outcome.record_success(name),
                Err(e) => {
                    error!("Failed to delete {}/{}: {}", location, name, e);
                    outcome.record_failure(name, e);
                }
            }
        }

        finish_batch("Emptied", location, outcome)
    }

    /// Moves every media file in `location` into `archive` under a timestamped name
    pub fn archive_all_files(&self, location: Location) -> Result<BatchOutcome, StorageError> {
        self.archive_all_files_at(location, Local::now())
    }

    /// [`FileStore::archive_all_files`] with an explicit clock reading
    pub fn archive_all_files_at(
        &self,
        location: Location,
        now: DateTime<Local>,
    ) -> Result<BatchOutcome, StorageError> {
        self.archive_all_with(location, now, relocate)
    }

    fn archive_all_with<F>(
        &self,
        location: Location,
        now: DateTime<Local>,
        mut move_to: F,
    ) -> Result<BatchOutcome, StorageError>
    where
        F: FnMut(&Path, &Path) -> io::Result<()>,
    {
        let source_dir = self.existing_dir(location)?;
        let archive_dir = self.existing_dir(Location::Archive)?;
        let timestamp = now.format(ARCHIVE_TIMESTAMP_FORMAT).to_string();
        let mut outcome = BatchOutcome::default();

        // Collected up front so archived files are never revisited when
        // `location` is the archive itself.
        let names: Vec<String> = self.iter_files(location)?.collect();
        for name in names {
            let source = source_dir.join(&name);
            let mut result = Err(io::Error::from(io::ErrorKind::AlreadyExists));
            // Another archiver may claim the chosen name first; pick again
            for _ in 0..ARCHIVE_NAME_ATTEMPTS {
                let dest = archive_destination(&archive_dir, &timestamp, &name);
                result = move_to(&source, &dest);
                if !matches!(&result, Err(e) if e.kind() == io::ErrorKind::AlreadyExists) {
                    break;
                }
            }
            match result {
                Ok(()) => outcome.record_success(name),
                Err(e) => {
                    error!("Failed to archive {}/{}: {}", location, name, e);
                    outcome.record_failure(name, e);
                }
            }
        }

        finish_batch("Archived", location, outcome)
    }

    /// Saves `bytes` as a new media file in `location`.
    ///
    /// The name is sanitized and must carry a media extension. An existing
    /// file is never overwritten; a counter suffix is chosen instead.
    /// Returns the name actually used.
    pub fn save_file(
        &self,
        location: Location,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        let clean = sanitize_filename(filename);
        if clean.is_empty() || !is_media(&clean, &self.config) {
            return Err(StorageError::InvalidFilename(filename.to_string()));
        }

        let dir = self.existing_dir(location)?;
        let dest = unique_destination(&dir, &clean);
        write_atomic(&dest, bytes).map_err(|e| {
            error!("Failed to save {} into {}: {}", clean, location, e);
            StorageError::from(e)
        })?;

        let saved = file_name_of(&dest);
        info!("Saved {}/{} ({} bytes)", location, saved, bytes.len());
        Ok(saved)
    }

    /// Reads a single media file
    pub fn read_file(&self, location: Location, filename: &str) -> Result<Vec<u8>, StorageError> {
        self.checked_name(filename)?;
        let path = self.existing_dir(location)?.join(filename);

        if !file_exists(&path) {
            return Err(StorageError::FileNotFound(format!("{location}/{filename}")));
        }

        Ok(fs::read(&path)?)
    }
}

/// `{ts}_{name}` in `archive_dir`, or `{ts}-{n}_{name}` if that is taken
fn archive_destination(archive_dir: &Path, timestamp: &str, name: &str) -> PathBuf {
    let first = archive_dir.join(format!("{timestamp}_{name}"));
    if fs::symlink_metadata(&first).is_err() {
        return first;
    }
    (1u32..)
        .map(|n| archive_dir.join(format!("{timestamp}-{n}_{name}")))
        .find(|path| fs::symlink_metadata(path).is_err())
        .unwrap_or(first)
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn finish_batch(
    action: &str,
    location: Location,
    outcome: BatchOutcome,
) -> Result<BatchOutcome, StorageError> {
    if outcome.is_complete() {
        info!("{} {} - {} files", action, location, outcome.succeeded.len());
        Ok(outcome)
    } else {
        warn!(
            "{} {} with failures - {} of {} files failed",
            action,
            location,
            outcome.failed.len(),
            outcome.total()
        );
        Err(StorageError::PartialFailure {
            location: location.name(),
            outcome,
        })
    }
}
