//! Folder catalog
//!
//! The closed set of storage locations. Client-supplied folder names are only
//! ever turned into paths through [`Location`], so an arbitrary route segment
//! can never reach the filesystem.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::StorageError;

pub const UNSORTED: &str = "unsorted";
pub const ARCHIVE: &str = "archive";

const FIRST_CATEGORY: u8 = 1;
const LAST_CATEGORY: u8 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Location {
    Unsorted,
    Category(u8),
    /// Internal destination of the archive action; never accepted from clients
    Archive,
}

/// True exactly for `unsorted` and `1`..`9`
pub fn is_valid_location(name: &str) -> bool {
    Location::from_user(name).is_ok()
}

impl Location {
    /// Validates a client-supplied location name
    pub fn from_user(name: &str) -> Result<Self, StorageError> {
        if name == UNSORTED {
            return Ok(Location::Unsorted);
        }

        // Exactly one ASCII digit: rejects "01", "+1", "10" and friends
        let category = match name.as_bytes() {
            [digit @ b'0'..=b'9'] => digit - b'0',
            _ => return Err(StorageError::InvalidLocation(name.to_string())),
        };

        Self::category(category).ok_or_else(|| StorageError::InvalidLocation(name.to_string()))
    }

    /// Numbered category, if `n` is in range
    pub fn category(n: u8) -> Option<Self> {
        (FIRST_CATEGORY..=LAST_CATEGORY)
            .contains(&n)
            .then_some(Location::Category(n))
    }

    /// Locations a client may name: `unsorted` then `1`..`9`
    pub fn user_selectable() -> impl Iterator<Item = Location> {
        std::iter::once(Location::Unsorted)
            .chain((FIRST_CATEGORY..=LAST_CATEGORY).map(Location::Category))
    }

    /// Every location that exists on disk
    pub fn all() -> impl Iterator<Item = Location> {
        Self::user_selectable().chain(std::iter::once(Location::Archive))
    }

    pub fn name(&self) -> String {
        match self {
            Location::Unsorted => UNSORTED.to_string(),
            Location::Category(n) => n.to_string(),
            Location::Archive => ARCHIVE.to_string(),
        }
    }

    /// Storage path of this location under `root`
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(self.name())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
