//! Intake of new media files
//!
//! Direct uploads and zip archives both land in `unsorted`.

pub mod archive;
pub mod operations;
pub mod results;

pub use archive::ingest_archive;
pub use operations::intake;
pub use results::{IntakeResult, Upload};
