//! Archive ingestion
//!
//! Extracts the media entries of an uploaded zip into a location. Entries are
//! flattened to their base name; directories, non-media files and nested
//! archives are skipped. Extraction goes through a staging directory so a
//! failing archive leaves nothing behind.

use log::{debug, error, info};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;
use zip::ZipArchive;

use crate::error::{IngestError, StorageError};
use crate::storage::filesystem::{directory_exists, unique_destination};
use crate::storage::validation::validated_media_name;
use crate::storage::{FileStore, Location};

/// Extracts the media files in `bytes` into `destination`.
///
/// Returns the names the files were stored under. The archive container is
/// removed afterwards whether or not extraction succeeded.
pub fn ingest_archive(
    store: &FileStore,
    bytes: &[u8],
    destination: Location,
) -> Result<Vec<String>, IngestError> {
    let dest_dir = store.location_path(destination);
    if !directory_exists(&dest_dir) {
        return Err(StorageError::DirectoryNotFound(destination.name()).into());
    }

    let id = Uuid::new_v4();
    let intake_path = dest_dir.join(format!(".intake-{id}.zip"));
    let staging_dir = dest_dir.join(format!(".staging-{id}"));

    fs::write(&intake_path, bytes)?;
    let result = extract_staged(store, &intake_path, &staging_dir, &dest_dir);

    if let Err(e) = fs::remove_dir_all(&staging_dir) {
        if e.kind() != io::ErrorKind::NotFound {
            error!("Failed to remove staging dir {}: {}", staging_dir.display(), e);
        }
    }
    if let Err(e) = fs::remove_file(&intake_path) {
        error!("Failed to remove intake archive {}: {}", intake_path.display(), e);
    }

    match &result {
        Ok(names) => info!("Ingested archive into {} - {} files", destination, names.len()),
        Err(e) => error!("Archive ingest into {} failed: {}", destination, e),
    }
    result
}

fn extract_staged(
    store: &FileStore,
    archive_path: &Path,
    staging_dir: &Path,
    dest_dir: &Path,
) -> Result<Vec<String>, IngestError> {
    fs::create_dir(staging_dir)?;
    let mut archive = ZipArchive::new(File::open(archive_path)?)?;
    let mut staged = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }

        let base_name = entry.name().rsplit(['/', '\\']).next().unwrap_or_default();
        let Some(name) = validated_media_name(base_name, store.config()) else {
            debug!("Skipping archive entry {}", entry.name());
            continue;
        };

        let target = unique_destination(staging_dir, &name);
        let mut out = File::create(&target)?;
        io::copy(&mut entry, &mut out)?;
        staged.push((target, name));
    }

    promote(&staged, dest_dir)
}

/// Renames staged files into `dest_dir`; on failure removes what was already placed
fn promote(staged: &[(PathBuf, String)], dest_dir: &Path) -> Result<Vec<String>, IngestError> {
    let mut placed: Vec<(PathBuf, String)> = Vec::with_capacity(staged.len());

    for (source, name) in staged {
        let dest = unique_destination(dest_dir, name);

        if let Err(e) = fs::rename(source, &dest) {
            for (path, _) in &placed {
                let _ = fs::remove_file(path);
            }
            return Err(e.into());
        }

        let stored = dest
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        placed.push((dest, stored));
    }

    Ok(placed.into_iter().map(|(_, name)| name).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use std::io::{Cursor, Write};
    use std::sync::Arc;
    use tempfile::TempDir;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn store() -> (TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::defaults_with_root(dir.path()).unwrap();
        let store = FileStore::new(Arc::new(config.storage));
        store.ensure_layout().unwrap();
        (dir, store)
    }

    fn build_zip(entries: &[(&str, &str)], dirs: &[&str]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for dir in dirs {
            writer.add_directory(*dir, options).unwrap();
        }
        for (name, data) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Every entry in the location directory, including hidden and non-media ones
    fn raw_entries(store: &FileStore, location: Location) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(store.location_path(location))
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn extracts_only_media_flattened() {
        let (_dir, store) = store();
        let bytes = build_zip(
            &[
                ("photos/sub/x.jpg", "jpeg-bytes"),
                ("readme.txt", "hello"),
                ("nested.zip", "PK"),
            ],
            &["photos/", "photos/sub/"],
        );

        let names = ingest_archive(&store, &bytes, Location::Unsorted).unwrap();

        assert_eq!(names, vec!["x.jpg".to_string()]);
        assert_eq!(raw_entries(&store, Location::Unsorted), vec!["x.jpg".to_string()]);
        assert_eq!(
            store.read_file(Location::Unsorted, "x.jpg").unwrap(),
            b"jpeg-bytes"
        );
    }

    #[test]
    fn duplicate_base_names_are_kept_apart() {
        let (_dir, store) = store();
        fs::write(store.location_path(Location::Unsorted).join("a.png"), b"old").unwrap();
        let bytes = build_zip(&[("one/a.png", "1"), ("two/a.png", "2")], &[]);

        let mut names = ingest_archive(&store, &bytes, Location::Unsorted).unwrap();
        names.sort();

        assert_eq!(names, vec!["a_1.png".to_string(), "a_2.png".to_string()]);
        assert_eq!(store.read_file(Location::Unsorted, "a.png").unwrap(), b"old");
    }

    #[test]
    fn traversal_entries_cannot_escape() {
        let (dir, store) = store();
        let bytes = build_zip(&[("../../escape.png", "x")], &[]);

        let names = ingest_archive(&store, &bytes, Location::Unsorted).unwrap();

        assert_eq!(names, vec!["escape.png".to_string()]);
        assert!(!dir.path().join("escape.png").exists());
    }

    #[test]
    fn corrupt_archive_fails_and_leaves_no_debris() {
        let (_dir, store) = store();

        let err = ingest_archive(&store, b"definitely not a zip", Location::Unsorted).unwrap_err();

        assert!(matches!(err, IngestError::InvalidArchive(_)));
        assert!(raw_entries(&store, Location::Unsorted).is_empty());
    }

    #[test]
    fn empty_archive_yields_nothing() {
        let (_dir, store) = store();
        let bytes = build_zip(&[("notes.md", "# hi")], &["empty/"]);

        let names = ingest_archive(&store, &bytes, Location::Unsorted).unwrap();

        assert!(names.is_empty());
        assert!(raw_entries(&store, Location::Unsorted).is_empty());
    }

    #[test]
    fn failed_promotion_removes_already_placed_files() {
        let staging = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        fs::write(dest.path().join("keep.png"), b"existing").unwrap();
        fs::write(staging.path().join("a.png"), b"a").unwrap();
        fs::write(staging.path().join("b.png"), b"b").unwrap();
        let staged = vec![
            (staging.path().join("a.png"), "a.png".to_string()),
            (staging.path().join("b.png"), "b.png".to_string()),
            (staging.path().join("vanished.png"), "c.png".to_string()),
        ];

        let err = promote(&staged, dest.path()).unwrap_err();

        assert!(matches!(err, IngestError::IoError(_)));
        let mut left: Vec<String> = fs::read_dir(dest.path())
            .unwrap()
            .flatten()
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        left.sort();
        assert_eq!(left, vec!["keep.png".to_string()]);
    }

    #[test]
    fn missing_destination_is_reported() {
        let (_dir, store) = store();
        fs::remove_dir_all(store.location_path(Location::Unsorted)).unwrap();
        let bytes = build_zip(&[("a.png", "1")], &[]);

        let err = ingest_archive(&store, &bytes, Location::Unsorted).unwrap_err();
        assert!(matches!(
            err,
            IngestError::Storage(StorageError::DirectoryNotFound(_))
        ));
    }
}
