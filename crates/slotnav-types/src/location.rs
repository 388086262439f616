//! Location identifiers.
//!
//! A [`Location`] is a normalized, URI-equivalent address of something a
//! slot can display. Plain absolute paths parse as `file://` locations.
//! Paths are kept in normal form (leading `/`, no `//`, no `.`/`..`
//! segments, no trailing `/` except for the root) so that two spellings of
//! the same place compare equal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NavError, Result};

/// Scheme used for plain filesystem paths.
pub const FILE_SCHEME: &str = "file";

/// Scheme of the trash virtual location.
pub const TRASH_SCHEME: &str = "trash";

/// A normalized location identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Location {
    scheme: String,
    host: String,
    path: String,
}

impl Location {
    /// Parse a location from a URI (`scheme://host/path`) or an absolute
    /// filesystem path.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(NavError::Location("empty location".into()));
        }

        if input.starts_with('/') {
            return Ok(Self {
                scheme: FILE_SCHEME.to_string(),
                host: String::new(),
                path: normalize_path(input),
            });
        }

        let Some(idx) = input.find("://") else {
            return Err(NavError::Location(format!(
                "not an absolute path or uri: {input}"
            )));
        };
        let scheme = &input[..idx];
        if scheme.is_empty()
            || !scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(NavError::Location(format!("invalid scheme in {input}")));
        }

        let rest = &input[idx + 3..];
        let (host, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };

        Ok(Self {
            scheme: scheme.to_ascii_lowercase(),
            host: host.to_string(),
            path: normalize_path(path),
        })
    }

    /// Build a local filesystem location from an absolute path.
    pub fn local(path: &str) -> Result<Self> {
        if !path.starts_with('/') {
            return Err(NavError::Location(format!("not an absolute path: {path}")));
        }
        Self::parse(path)
    }

    /// The root of the local filesystem.
    pub fn root() -> Self {
        Self {
            scheme: FILE_SCHEME.to_string(),
            host: String::new(),
            path: "/".to_string(),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full URI form, e.g. `file:///home/user`.
    pub fn uri(&self) -> String {
        format!("{}://{}{}", self.scheme, self.host, self.path)
    }

    /// Human-readable form: the bare path for local files, the URI
    /// otherwise.
    pub fn parse_name(&self) -> String {
        if self.is_local() {
            self.path.clone()
        } else {
            self.uri()
        }
    }

    /// Last path segment, falling back to the host or `/` at a root.
    pub fn basename(&self) -> &str {
        match self.path.rfind('/') {
            Some(i) if i + 1 < self.path.len() => &self.path[i + 1..],
            _ if !self.host.is_empty() => &self.host,
            _ => "/",
        }
    }

    /// Whether this location lives on the local filesystem.
    pub fn is_local(&self) -> bool {
        self.scheme == FILE_SCHEME
    }

    /// Whether this is the local filesystem root.
    pub fn is_root(&self) -> bool {
        self.is_local() && self.path == "/"
    }

    /// Whether this location is inside the trash.
    pub fn is_in_trash(&self) -> bool {
        self.scheme == TRASH_SCHEME
    }

    /// Parent location, or `None` at the root of the scheme/host.
    pub fn parent(&self) -> Option<Self> {
        if self.path == "/" {
            return None;
        }
        let parent = match self.path.rfind('/') {
            Some(0) | None => "/",
            Some(i) => &self.path[..i],
        };
        Some(Self {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            path: parent.to_string(),
        })
    }

    /// Child location named `name`.
    pub fn join(&self, name: &str) -> Self {
        let joined = if self.path == "/" {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.path)
        };
        Self {
            scheme: self.scheme.clone(),
            host: self.host.clone(),
            path: normalize_path(&joined),
        }
    }

    /// Whether `self` equals `other` or contains it.
    pub fn contains(&self, other: &Location) -> bool {
        if self.scheme != other.scheme || self.host != other.host {
            return false;
        }
        if self.path == "/" || self.path == other.path {
            return true;
        }
        other
            .path
            .strip_prefix(self.path.as_str())
            .is_some_and(|rest| rest.starts_with('/'))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.host, self.path)
    }
}

impl FromStr for Location {
    type Err = NavError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Location {
    type Error = NavError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Location> for String {
    fn from(location: Location) -> Self {
        location.uri()
    }
}

/// Normalize a path: ensure a leading `/`, collapse repeated slashes,
/// resolve `.` and `..`, and strip any trailing `/` except for the root.
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            s => segments.push(s),
        }
    }
    if segments.is_empty() {
        return "/".to_string();
    }
    let mut result = String::with_capacity(path.len());
    for segment in segments {
        result.push('/');
        result.push_str(segment);
    }
    result
}
