//! Remote storage client
//!
//! `RemoteStore` is the seam the import operation talks to. `DriveClient`
//! implements it over the Google Drive v3 REST API.

use async_trait::async_trait;
use log::{debug, info};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::config::RemoteConfig;
use crate::error::RemoteError;
use crate::remote::credentials::Credential;
use crate::remote::results::{RemoteFile, RemoteFolder};

const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// MIME types fetched by an import, with the extension used when a remote name has none
pub const IMAGE_MIME_TYPES: [(&str, &str); 3] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
];

/// Longest error body carried into a `RemoteError::Status`
const MAX_ERROR_BODY: usize = 512;

#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Every folder visible to `credential`
    async fn list_folders(&self, credential: &Credential) -> Result<Vec<RemoteFolder>, RemoteError>;

    /// Image files directly inside `folder_id`
    async fn list_media(
        &self,
        credential: &Credential,
        folder_id: &str,
    ) -> Result<Vec<RemoteFile>, RemoteError>;

    /// Content of one file
    async fn download(&self, credential: &Credential, file: &RemoteFile)
    -> Result<Vec<u8>, RemoteError>;
}

/// Rejects ids that could break out of a Drive query string or URL path
pub fn validate_remote_id(id: &str) -> Result<(), RemoteError> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(RemoteError::InvalidFolderId(id.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct FolderList {
    #[serde(default)]
    files: Vec<RemoteFolder>,
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<RemoteFile>,
}

pub struct DriveClient {
    client: reqwest::Client,
    base_url: String,
}

impl DriveClient {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn files_url(&self) -> String {
        format!("{}/files", self.base_url)
    }

    fn media_query(folder_id: &str) -> String {
        let mime_clause = IMAGE_MIME_TYPES
            .iter()
            .map(|(mime, _)| format!("mimeType='{mime}'"))
            .collect::<Vec<_>>()
            .join(" or ");
        format!("'{folder_id}' in parents and ({mime_clause})")
    }

    async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(RemoteError::Unauthenticated);
        }
        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            message.truncate(MAX_ERROR_BODY);
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl RemoteStore for DriveClient {
    async fn list_folders(&self, credential: &Credential) -> Result<Vec<RemoteFolder>, RemoteError> {
        let query = format!("mimeType='{FOLDER_MIME_TYPE}'");
        let request = self
            .client
            .get(self.files_url())
            .bearer_auth(credential.access_token())
            .query(&[("q", query.as_str()), ("fields", "files(id,name)")]);

        let list: FolderList = Self::send(request).await?.json().await?;
        info!("Listed {} remote folders", list.files.len());
        Ok(list.files)
    }

    async fn list_media(
        &self,
        credential: &Credential,
        folder_id: &str,
    ) -> Result<Vec<RemoteFile>, RemoteError> {
        validate_remote_id(folder_id)?;
        let query = Self::media_query(folder_id);
        let request = self
            .client
            .get(self.files_url())
            .bearer_auth(credential.access_token())
            .query(&[("q", query.as_str()), ("fields", "files(id,name,mimeType)")]);

        let list: FileList = Self::send(request).await?.json().await?;
        info!("Remote folder {} holds {} images", folder_id, list.files.len());
        Ok(list.files)
    }

    async fn download(
        &self,
        credential: &Credential,
        file: &RemoteFile,
    ) -> Result<Vec<u8>, RemoteError> {
        validate_remote_id(&file.id)?;
        let request = self
            .client
            .get(format!("{}/{}", self.files_url(), file.id))
            .bearer_auth(credential.access_token())
            .query(&[("alt", "media")]);

        let bytes = Self::send(request).await?.bytes().await?;
        debug!("Downloaded remote file {} ({} bytes)", file.name, bytes.len());
        Ok(bytes.to_vec())
    }
}
