//! Folder bundling
//!
//! Packs the media files of one location into an in-memory zip for download.

use log::info;
use std::fs::File;
use std::io::{self, Cursor};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::StorageError;
use crate::storage::catalog::Location;
use crate::storage::operations::FileStore;

/// Suggested download name for a bundled location
pub fn bundle_name(location: Location) -> String {
    format!("folder_{location}.zip")
}

/// Zips every media file in `location`, flat, keyed by filename
pub fn bundle_location(store: &FileStore, location: Location) -> Result<Vec<u8>, StorageError> {
    let dir = store.location_path(location);
    let names: Vec<String> = store.iter_files(location)?.collect();

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for name in &names {
        let mut file = File::open(dir.join(name))?;
        writer.start_file(name.as_str(), options).map_err(zip_to_io)?;
        io::copy(&mut file, &mut writer)?;
    }

    let bytes = writer.finish().map_err(zip_to_io)?.into_inner();
    info!("Bundled {} - {} files, {} bytes", location, names.len(), bytes.len());
    Ok(bytes)
}

fn zip_to_io(err: zip::result::ZipError) -> StorageError {
    StorageError::IoError(io::Error::other(err))
}
