//! Image Sorter - Entry Point
//!
//! A small web service for triaging uploaded images into numbered folders.

use log::{error, info};
use std::process::ExitCode;

use image_sorter::config::AppConfig;
use image_sorter::server::Server;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Launching image sorter...");

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = server.start().await {
        error!("Server stopped: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
