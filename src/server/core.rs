use log::{error, info};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::api;
use crate::config::AppConfig;
use crate::error::ServerError;
use crate::remote::{DriveClient, RemoteStore};
use crate::server::state::AppState;

pub struct Server {
    listener: TcpListener,
    state: AppState,
}

impl Server {
    /// Binds the configured socket and prepares the storage layout
    pub async fn new(config: AppConfig) -> Result<Self, ServerError> {
        let remote = Arc::new(DriveClient::new(&config.remote)?);
        Self::with_remote(config, remote).await
    }

    /// Like `new`, with an explicit remote store
    pub async fn with_remote(
        config: AppConfig,
        remote: Arc<dyn RemoteStore>,
    ) -> Result<Self, ServerError> {
        let config = Arc::new(config);
        let address = config.server.listen_socket();

        let listener = match TcpListener::bind(&address).await {
            Ok(listener) => {
                info!("Server bound to {}", address);
                listener
            }
            Err(source) => {
                error!("Failed to bind to {}: {}", address, source);
                return Err(ServerError::Bind { address, source });
            }
        };

        let state = AppState::new(Arc::clone(&config), remote);
        state.store.ensure_layout()?;
        info!("Storage root: {}", state.store.root().display());

        Ok(Self { listener, state })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn start(self) -> Result<(), ServerError> {
        info!(
            "Starting image sorter on {} (uploads up to {} MB)",
            self.local_addr()?,
            self.state.config.upload.max_upload_size_mb
        );

        let router = api::router(self.state);
        axum::serve(self.listener, router).await?;
        Ok(())
    }
}
