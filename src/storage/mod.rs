//! File system storage management
//!
//! The folder catalog, filename validation, and the file state store that
//! owns the on-disk layout.

pub mod bundle;
pub mod catalog;
pub mod filesystem;
pub mod operations;
pub mod results;
pub mod validation;

pub use catalog::{Location, is_valid_location};
pub use operations::FileStore;
pub use results::{BatchOutcome, FailedItem, FolderStats};
