//! Server core functionality
//!
//! Listener setup, shared state and the serve loop.

pub mod core;
pub mod state;

pub use self::core::Server;
pub use state::AppState;
