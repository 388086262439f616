//! Error types for slotnav.

use std::io;

use crate::ids::{SlotId, WindowId};

/// Errors produced by the navigation framework.
///
/// Provider failures for a single file operation are not reported through
/// this type; they travel as data in [`crate::file::FileError`].
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("location error: {0}")]
    Location(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("history error: {0}")]
    History(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("unknown slot: {0}")]
    UnknownSlot(SlotId),

    #[error("unknown window: {0}")]
    UnknownWindow(WindowId),

    #[error("{0} has no current location")]
    NoLocation(SlotId),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, NavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_error_display() {
        let e = NavError::Location("empty uri".into());
        assert_eq!(format!("{e}"), "location error: empty uri");
    }

    #[test]
    fn config_error_display() {
        let e = NavError::Config("missing key".into());
        assert_eq!(format!("{e}"), "config error: missing key");
    }

    #[test]
    fn history_error_display() {
        let e = NavError::History("back list too short".into());
        assert_eq!(format!("{e}"), "history error: back list too short");
    }

    #[test]
    fn unsupported_display() {
        let e = NavError::Unsupported("tabs in a spatial window".into());
        assert_eq!(format!("{e}"), "unsupported: tabs in a spatial window");
    }

    #[test]
    fn unknown_slot_display() {
        let e = NavError::UnknownSlot(SlotId(7));
        assert_eq!(format!("{e}"), "unknown slot: slot#7");
    }

    #[test]
    fn no_location_display() {
        let e = NavError::NoLocation(SlotId(2));
        assert_eq!(format!("{e}"), "slot#2 has no current location");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: NavError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let bad_toml = "this is [[[not valid toml";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let e: NavError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn result_alias_err() {
        let r: Result<i32> = Err(NavError::Provider("oops".into()));
        assert!(r.is_err());
    }
}
