//! Intake result types

use serde::Serialize;

/// A file received from a client, before validation
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Result of an intake request
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct IntakeResult {
    /// Names of the media files now in `unsorted`, as stored
    pub accepted: Vec<String>,
    /// Client-supplied names of uploads that were not stored
    pub rejected: Vec<String>,
}
