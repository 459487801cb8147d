//! Remote storage result types

use serde::{Deserialize, Serialize};

use crate::storage::FailedItem;

/// A folder in the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFolder {
    pub id: String,
    pub name: String,
}

/// A media file in a remote folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(rename = "mimeType", default)]
    pub mime_type: Option<String>,
}

/// A remote file together with its downloaded content
#[derive(Debug, Clone)]
pub struct FetchedFile {
    pub file: RemoteFile,
    pub bytes: Vec<u8>,
}

/// Outcome of fetching a remote folder: what arrived and what did not
#[derive(Debug, Default)]
pub struct FetchedMedia {
    pub files: Vec<FetchedFile>,
    pub failed: Vec<FailedItem>,
}
