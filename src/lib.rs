pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod middleware;
pub mod remote;
pub mod server;
pub mod storage;

pub use server::Server;
