//! Remote import module
//!
//! Pulls images from a third-party cloud folder into `unsorted`.

pub mod client;
pub mod credentials;
pub mod operations;
pub mod results;

pub use client::{DriveClient, RemoteStore};
pub use credentials::Credential;
pub use operations::{fetch_remote_media, import_remote_folder};
pub use results::{FetchedFile, FetchedMedia, RemoteFile, RemoteFolder};
