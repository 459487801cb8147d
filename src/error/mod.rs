//! Error handling
//!
//! Defines error types and handling for the image sorter.

pub mod handlers;
pub mod types;

pub use types::*;
