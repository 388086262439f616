//! File metadata and the provider error taxonomy.

use std::collections::BTreeMap;
use std::io;

use serde::Serialize;

use crate::location::Location;

/// Per-location metadata key holding the preferred view id.
pub const METADATA_KEY_DEFAULT_VIEW: &str = "default-view";

/// Per-location metadata key holding the saved scroll position (an item
/// identifier) of a spatial window.
pub const METADATA_KEY_SCROLL_POSITION: &str = "window-scroll-position";

/// Why a provider operation failed. Carried as data in completions, never
/// propagated as a [`crate::NavError`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileError {
    #[error("not found")]
    NotFound,
    #[error("operation not supported")]
    NotSupported,
    #[error("location is not mounted")]
    NotMounted,
    #[error("permission denied")]
    PermissionDenied,
    #[error("host not found")]
    HostNotFound,
    #[error("operation was cancelled")]
    Cancelled,
    #[error("{0}")]
    Other(String),
}

impl FileError {
    /// Translate a transport error into the taxonomy.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            io::ErrorKind::Unsupported => Self::NotSupported,
            io::ErrorKind::Interrupted => Self::Cancelled,
            _ => Self::Other(err.to_string()),
        }
    }
}

impl From<io::Error> for FileError {
    fn from(err: io::Error) -> Self {
        Self::from_io(&err)
    }
}

/// Kind of entity backing a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    Regular,
    Directory,
    Symlink,
    Special,
    Mountable,
    #[default]
    Unknown,
}

/// Metadata describing a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub location: Location,
    pub file_type: FileType,
    pub mime_type: String,
    pub display_name: String,
    /// Per-location key/value metadata (view preference, scroll position).
    pub metadata: BTreeMap<String, String>,
}

impl FileInfo {
    /// Placeholder info for a location nothing is known about.
    pub fn unknown(location: &Location) -> Self {
        Self {
            location: location.clone(),
            file_type: FileType::Unknown,
            mime_type: String::new(),
            display_name: location.basename().to_string(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn is_in_trash(&self) -> bool {
        self.location.is_in_trash()
    }
}

/// Outcome of a metadata fetch: the info gathered so far plus an optional
/// error. Both are present when the provider could describe the location
/// but not open it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfoResult {
    pub info: FileInfo,
    pub error: Option<FileError>,
}

impl FileInfoResult {
    pub fn ok(info: FileInfo) -> Self {
        Self { info, error: None }
    }

    pub fn failed(location: &Location, error: FileError) -> Self {
        Self {
            info: FileInfo::unknown(location),
            error: Some(error),
        }
    }
}

/// A mounted volume enclosing some location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountInfo {
    pub name: String,
    pub root: Location,
    /// Content types detected on the volume (`x-content/...`).
    pub content_types: Vec<String>,
}

/// A change to the entity backing a watched location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// Deleted outright.
    Gone,
    /// Moved into the trash.
    MovedToTrash,
    /// Moved or renamed to a new location.
    Renamed(Location),
    /// Contents or attributes changed in place.
    Changed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_taxonomy() {
        let cases = [
            (io::ErrorKind::NotFound, FileError::NotFound),
            (io::ErrorKind::PermissionDenied, FileError::PermissionDenied),
            (io::ErrorKind::Unsupported, FileError::NotSupported),
            (io::ErrorKind::Interrupted, FileError::Cancelled),
        ];
        for (kind, expected) in cases {
            let err = io::Error::new(kind, "x");
            assert_eq!(FileError::from_io(&err), expected);
        }
        let other: FileError = io::Error::other("disk on fire").into();
        assert_eq!(other, FileError::Other("disk on fire".into()));
    }

    #[test]
    fn other_error_displays_message() {
        assert_eq!(format!("{}", FileError::Other("bad".into())), "bad");
        assert_eq!(format!("{}", FileError::NotMounted), "location is not mounted");
    }

    #[test]
    fn unknown_info_uses_basename() {
        let loc = Location::parse("/home/user/docs").unwrap();
        let info = FileInfo::unknown(&loc);
        assert_eq!(info.display_name, "docs");
        assert!(!info.is_directory());
        assert!(info.metadata(METADATA_KEY_DEFAULT_VIEW).is_none());
    }

    #[test]
    fn failed_result_keeps_error() {
        let loc = Location::parse("/nope").unwrap();
        let result = FileInfoResult::failed(&loc, FileError::NotFound);
        assert_eq!(result.error, Some(FileError::NotFound));
        assert_eq!(result.info.location, loc);
    }

    #[test]
    fn trash_info() {
        let loc = Location::parse("trash:///").unwrap();
        assert!(FileInfo::unknown(&loc).is_in_trash());
    }
}
