//! Response bodies
//!
//! JSON shapes returned by the HTTP handlers. Errors have their own body,
//! built in `error::handlers`.

use serde::Serialize;

use crate::remote::RemoteFolder;
use crate::storage::BatchOutcome;

#[derive(Debug, Serialize)]
pub struct FileList {
    pub files: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct Done {
    pub ok: bool,
}

impl Done {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Result of emptying a folder
#[derive(Debug, Serialize)]
pub struct Emptied {
    pub ok: bool,
    pub removed: Vec<String>,
}

/// Result of archiving a folder
#[derive(Debug, Serialize)]
pub struct Archived {
    pub ok: bool,
    pub archived: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FolderList {
    pub folders: Vec<RemoteFolder>,
}

/// Result of a remote folder import; only failed filenames leave the server
#[derive(Debug, Serialize)]
pub struct Imported {
    pub imported: Vec<String>,
    pub failed: Vec<String>,
}

impl From<BatchOutcome> for Imported {
    fn from(outcome: BatchOutcome) -> Self {
        let failed = outcome
            .failed_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        Self {
            imported: outcome.succeeded,
            failed,
        }
    }
}
