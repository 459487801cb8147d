//! Remote import operations

use log::{info, warn};

use crate::config::StorageConfig;
use crate::error::RemoteError;
use crate::remote::client::{IMAGE_MIME_TYPES, RemoteStore};
use crate::remote::credentials::Credential;
use crate::remote::results::{FetchedFile, FetchedMedia, RemoteFile};
use crate::storage::validation::{sanitize_filename, validated_media_name};
use crate::storage::{BatchOutcome, FailedItem, FileStore, Location};

/// Downloads every image in `folder_id`.
///
/// A file that fails to download is recorded in `failed` and the rest are
/// still fetched. An expired or missing credential aborts the whole fetch.
pub async fn fetch_remote_media(
    remote: &dyn RemoteStore,
    credential: &Credential,
    folder_id: &str,
) -> Result<FetchedMedia, RemoteError> {
    let files = remote.list_media(credential, folder_id).await?;
    let mut fetched = FetchedMedia::default();

    for file in files {
        match remote.download(credential, &file).await {
            Ok(bytes) => fetched.files.push(FetchedFile { file, bytes }),
            Err(RemoteError::Unauthenticated) => return Err(RemoteError::Unauthenticated),
            Err(e) => {
                warn!("Failed to download remote file {}: {}", file.name, e);
                fetched.failed.push(FailedItem {
                    filename: file.name,
                    cause: e.to_string(),
                });
            }
        }
    }
    Ok(fetched)
}

/// Imports every image in `folder_id` into `unsorted`
pub async fn import_remote_folder(
    store: &FileStore,
    remote: &dyn RemoteStore,
    credential: &Credential,
    folder_id: &str,
) -> Result<BatchOutcome, RemoteError> {
    let fetched = fetch_remote_media(remote, credential, folder_id).await?;
    let mut outcome = BatchOutcome {
        succeeded: Vec::new(),
        failed: fetched.failed,
    };

    for FetchedFile { file, bytes } in fetched.files {
        let Some(name) = local_name(&file, store.config()) else {
            warn!("Skipping remote file {:?}: not an accepted image", file.name);
            outcome.record_failure(file.name, "unsupported file type");
            continue;
        };

        let task_store = store.clone();
        let saved = tokio::task::spawn_blocking(move || {
            task_store.save_file(Location::Unsorted, &name, &bytes)
        })
        .await;

        match saved {
            Ok(Ok(stored)) => outcome.record_success(stored),
            Ok(Err(e)) => {
                warn!("Failed to store remote file {}: {}", file.name, e);
                outcome.record_failure(file.name, e);
            }
            Err(e) => outcome.record_failure(file.name, e),
        }
    }

    info!(
        "Imported remote folder {} - {} stored, {} failed",
        folder_id,
        outcome.succeeded.len(),
        outcome.failed.len()
    );
    Ok(outcome)
}

/// Local filename for a remote file, adding an extension from its MIME type if needed
fn local_name(file: &RemoteFile, config: &StorageConfig) -> Option<String> {
    if let Some(name) = validated_media_name(&file.name, config) {
        return Some(name);
    }

    let mime = file.mime_type.as_deref()?;
    let (_, ext) = IMAGE_MIME_TYPES.iter().find(|(m, _)| *m == mime)?;
    let stem = sanitize_filename(&file.name);
    let stem = if stem.is_empty() { file.id.as_str() } else { stem.as_str() };
    validated_media_name(&format!("{stem}.{ext}"), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::remote::results::RemoteFolder;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tempfile::TempDir;

    /// In-memory remote keyed by file id; ids in `broken` fail to download
    struct MockRemote {
        files: Vec<RemoteFile>,
        content: HashMap<String, Vec<u8>>,
        broken: Vec<String>,
        expired: bool,
    }

    impl MockRemote {
        fn new(entries: &[(&str, &str, Option<&str>, &str)]) -> Self {
            let mut files = Vec::new();
            let mut content = HashMap::new();
            for (id, name, mime, data) in entries {
                files.push(RemoteFile {
                    id: id.to_string(),
                    name: name.to_string(),
                    mime_type: mime.map(str::to_string),
                });
                content.insert(id.to_string(), data.as_bytes().to_vec());
            }
            Self { files, content, broken: Vec::new(), expired: false }
        }
    }

    #[async_trait]
    impl RemoteStore for MockRemote {
        async fn list_folders(&self, _: &Credential) -> Result<Vec<RemoteFolder>, RemoteError> {
            Ok(vec![RemoteFolder { id: "f1".into(), name: "Holiday".into() }])
        }

        async fn list_media(
            &self,
            _: &Credential,
            _: &str,
        ) -> Result<Vec<RemoteFile>, RemoteError> {
            if self.expired {
                return Err(RemoteError::Unauthenticated);
            }
            Ok(self.files.clone())
        }

        async fn download(
            &self,
            _: &Credential,
            file: &RemoteFile,
        ) -> Result<Vec<u8>, RemoteError> {
            if self.broken.contains(&file.id) {
                return Err(RemoteError::Status { status: 500, message: "boom".into() });
            }
            self.content
                .get(&file.id)
                .cloned()
                .ok_or(RemoteError::Status { status: 404, message: String::new() })
        }
    }

    fn store() -> (TempDir, FileStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::defaults_with_root(dir.path()).unwrap();
        let store = FileStore::new(Arc::new(config.storage));
        store.ensure_layout().unwrap();
        (dir, store)
    }

    fn credential() -> Credential {
        Credential::bearer("token").unwrap()
    }

    #[tokio::test]
    async fn imports_into_unsorted() {
        let (_dir, store) = store();
        let remote = MockRemote::new(&[
            ("1", "beach.png", Some("image/png"), "png"),
            ("2", "sunset", Some("image/jpeg"), "jpeg"),
        ]);

        let outcome = import_remote_folder(&store, &remote, &credential(), "f1")
            .await
            .unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.succeeded, vec!["beach.png".to_string(), "sunset.jpg".to_string()]);
        assert_eq!(store.read_file(Location::Unsorted, "sunset.jpg").unwrap(), b"jpeg");
    }

    #[tokio::test]
    async fn one_failed_download_does_not_stop_the_batch() {
        let (_dir, store) = store();
        let mut remote = MockRemote::new(&[
            ("1", "a.png", Some("image/png"), "a"),
            ("2", "b.png", Some("image/png"), "b"),
            ("3", "c.gif", Some("image/gif"), "c"),
        ]);
        remote.broken.push("2".into());

        let outcome = import_remote_folder(&store, &remote, &credential(), "f1")
            .await
            .unwrap();

        assert_eq!(outcome.succeeded, vec!["a.png".to_string(), "c.gif".to_string()]);
        assert_eq!(outcome.failed_names(), vec!["b.png"]);
        assert_eq!(store.count(Location::Unsorted).unwrap(), 2);
    }

    #[tokio::test]
    async fn name_collisions_are_deduplicated() {
        let (_dir, store) = store();
        store.save_file(Location::Unsorted, "a.png", b"local").unwrap();
        let remote = MockRemote::new(&[("1", "a.png", Some("image/png"), "remote")]);

        let outcome = import_remote_folder(&store, &remote, &credential(), "f1")
            .await
            .unwrap();

        assert_eq!(outcome.succeeded, vec!["a_1.png".to_string()]);
        assert_eq!(store.read_file(Location::Unsorted, "a.png").unwrap(), b"local");
    }

    #[tokio::test]
    async fn unsupported_files_are_recorded_as_failed() {
        let (_dir, store) = store();
        let remote = MockRemote::new(&[("1", "clip.mp4", Some("video/mp4"), "mp4")]);

        let outcome = import_remote_folder(&store, &remote, &credential(), "f1")
            .await
            .unwrap();

        assert!(outcome.succeeded.is_empty());
        assert_eq!(outcome.failed_names(), vec!["clip.mp4"]);
        assert_eq!(store.count(Location::Unsorted).unwrap(), 0);
    }

    #[tokio::test]
    async fn expired_credential_aborts() {
        let (_dir, store) = store();
        let mut remote = MockRemote::new(&[("1", "a.png", Some("image/png"), "a")]);
        remote.expired = true;

        let err = import_remote_folder(&store, &remote, &credential(), "f1")
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Unauthenticated));
    }

    #[tokio::test]
    async fn fetch_collects_failed_downloads() {
        let mut remote = MockRemote::new(&[
            ("1", "a.png", Some("image/png"), "a"),
            ("2", "b.png", Some("image/png"), "b"),
        ]);
        remote.broken.push("1".into());

        let fetched = fetch_remote_media(&remote, &credential(), "f1").await.unwrap();

        assert_eq!(fetched.files.len(), 1);
        assert_eq!(fetched.files[0].file.name, "b.png");
        assert_eq!(fetched.files[0].bytes, b"b");
        assert_eq!(fetched.failed.len(), 1);
        assert_eq!(fetched.failed[0].filename, "a.png");
        assert!(fetched.failed[0].cause.contains("500"));
    }
}
