//! Shared request state

use std::sync::Arc;

use crate::config::AppConfig;
use crate::remote::RemoteStore;
use crate::storage::FileStore;

/// Everything a handler needs, cloned per request
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: FileStore,
    pub remote: Arc<dyn RemoteStore>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, remote: Arc<dyn RemoteStore>) -> Self {
        let store = FileStore::new(Arc::new(config.storage.clone()));
        Self {
            config,
            store,
            remote,
        }
    }
}
