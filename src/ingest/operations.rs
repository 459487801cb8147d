//! Intake operations
//!
//! Routes each uploaded file to a direct save or to archive extraction.
//! One bad upload never fails the others.

use log::{info, warn};

use crate::ingest::archive::ingest_archive;
use crate::ingest::results::{IntakeResult, Upload};
use crate::storage::validation::{is_archive, is_intake, sanitize_filename};
use crate::storage::{FileStore, Location};

/// Stores every acceptable upload in `unsorted`
pub fn intake(store: &FileStore, uploads: Vec<Upload>) -> IntakeResult {
    let mut result = IntakeResult::default();

    for upload in uploads {
        let clean = sanitize_filename(&upload.filename);
        if clean.is_empty() || !is_intake(&clean, store.config()) {
            warn!("Rejected upload {:?}: file type not allowed", upload.filename);
            result.rejected.push(upload.filename);
            continue;
        }

        if is_archive(&clean, store.config()) {
            match ingest_archive(store, &upload.bytes, Location::Unsorted) {
                Ok(names) => result.accepted.extend(names),
                Err(e) => {
                    warn!("Rejected archive {:?}: {}", upload.filename, e);
                    result.rejected.push(upload.filename);
                }
            }
            continue;
        }

        match store.save_file(Location::Unsorted, &clean, &upload.bytes) {
            Ok(name) => result.accepted.push(name),
            Err(e) => {
                warn!("Rejected upload {:?}: {}", upload.filename, e);
                result.rejected.push(upload.filename);
            }
        }
    }

    info!(
        "Intake complete - {} accepted, {} rejected",
        result.accepted.len(),
        result.rejected.len()
    );
    result
}
