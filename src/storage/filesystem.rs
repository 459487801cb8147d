//! File system primitives
//!
//! Low-level helpers shared by the store, the bundler and the ingestor.

use std::fs;
use std::io::{self, ErrorKind, Result, Write};
use std::path::{Path, PathBuf};

/// Create a directory and its parents
pub fn create_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
}

/// Check if a regular file exists (symlinks are not followed)
pub fn file_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|meta| meta.is_file())
}

/// Check if directory exists
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Splits `name` into stem and extension (with the leading dot)
fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// First free path in `dir` for `name`: `name`, then `stem_1.ext`, `stem_2.ext`, ...
pub fn unique_destination(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if fs::symlink_metadata(&candidate).is_err() {
        return candidate;
    }

    let (stem, ext) = split_name(name);
    (1u32..)
        .map(|n| dir.join(format!("{stem}_{n}{ext}")))
        .find(|path| fs::symlink_metadata(path).is_err())
        .unwrap_or(candidate)
}

/// Moves `source` to `destination`, failing with `AlreadyExists` instead of
/// replacing a file that is already there.
///
/// The file is hard-linked into place and the old link removed. Where hard
/// links are unavailable (another volume, a filesystem without them) the
/// content is copied into a newly created file instead; a partial copy is
/// deleted on failure so the source is the only surviving file.
pub fn relocate(source: &Path, destination: &Path) -> Result<()> {
    match fs::hard_link(source, destination) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(source) {
                let _ = fs::remove_file(destination);
                return Err(e);
            }
            Ok(())
        }
        Err(e) if matches!(e.kind(), ErrorKind::AlreadyExists | ErrorKind::NotFound) => Err(e),
        Err(_) => copy_new(source, destination),
    }
}

fn copy_new(source: &Path, destination: &Path) -> Result<()> {
    let mut input = fs::File::open(source)?;
    let mut output = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)?;

    let copied = io::copy(&mut input, &mut output).and_then(|_| output.sync_all());
    drop(output);
    if let Err(e) = copied {
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    if let Err(e) = fs::remove_file(source) {
        let _ = fs::remove_file(destination);
        return Err(e);
    }
    Ok(())
}

/// Writes `bytes` to a `.part` sibling of `destination`, then renames it into place
pub fn write_atomic(destination: &Path, bytes: &[u8]) -> Result<()> {
    let file_name = destination
        .file_name()
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "destination has no file name"))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".part");
    let temp_path = destination.with_file_name(temp_name);

    let result = (|| {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, destination)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_destination_appends_counter() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(unique_destination(dir.path(), "a.png"), dir.path().join("a.png"));

        fs::write(dir.path().join("a.png"), b"1").unwrap();
        assert_eq!(unique_destination(dir.path(), "a.png"), dir.path().join("a_1.png"));

        fs::write(dir.path().join("a_1.png"), b"2").unwrap();
        assert_eq!(unique_destination(dir.path(), "a.png"), dir.path().join("a_2.png"));
    }

    #[test]
    fn unique_destination_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blob"), b"1").unwrap();
        assert_eq!(unique_destination(dir.path(), "blob"), dir.path().join("blob_1"));
    }

    #[test]
    fn write_atomic_leaves_no_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("x.gif");

        write_atomic(&target, b"GIF89a").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"GIF89a");
        assert!(!dir.path().join("x.gif.part").exists());
    }

    #[test]
    fn relocate_moves_within_volume() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.png");
        let dst = dir.path().join("b.png");
        fs::write(&src, b"data").unwrap();

        relocate(&src, &dst).unwrap();

        assert!(!src.exists());
        assert!(file_exists(&dst));
    }

    #[test]
    fn relocate_missing_source_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = relocate(&dir.path().join("nope.png"), &dir.path().join("b.png")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn relocate_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.png");
        let dst = dir.path().join("b.png");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();

        let err = relocate(&src, &dst).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&src).unwrap(), b"new");
        assert_eq!(fs::read(&dst).unwrap(), b"old");
    }

    #[test]
    fn copy_fallback_moves_content_and_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.png");
        let dst = dir.path().join("b.png");
        fs::write(&src, b"data").unwrap();

        copy_new(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"data");

        fs::write(&src, b"again").unwrap();
        assert_eq!(copy_new(&src, &dst).unwrap_err().kind(), ErrorKind::AlreadyExists);
        assert_eq!(fs::read(&src).unwrap(), b"again");
        assert_eq!(fs::read(&dst).unwrap(), b"data");
    }
}
