//! Transition requests and open-location options.

use serde::Serialize;
use slotnav_types::{FileError, Location};

/// Why a slot is changing location. Decides how history is updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    /// Going somewhere new: forward history is discarded.
    Standard,
    /// Going back `distance + 1` entries.
    Back,
    /// Going forward `distance + 1` entries.
    Forward,
    /// Redisplaying the current location.
    Reload,
    /// Following a redirect; the caller owns any history bookkeeping.
    Redirect,
    /// Recovering from a view that could not display the target. Ignores the
    /// per-location view preference.
    Fallback,
}

impl ChangeType {
    /// Whether `distance` is meaningful for this change.
    pub fn uses_distance(self) -> bool {
        matches!(self, ChangeType::Back | ChangeType::Forward)
    }
}

/// One pending transition of a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRequest {
    pub target: Location,
    pub selection: Vec<Location>,
    pub change_type: ChangeType,
    pub distance: usize,
    pub scroll_target: Option<Location>,
    /// Whether a mount was already attempted for this transition.
    pub tried_mount: bool,
    /// Error returned by the failed mount attempt, if any.
    pub mount_error: Option<FileError>,
}

impl LocationRequest {
    pub fn new(target: Location, change_type: ChangeType) -> Self {
        Self {
            target,
            selection: Vec::new(),
            change_type,
            distance: 0,
            scroll_target: None,
            tried_mount: false,
            mount_error: None,
        }
    }

    pub fn with_selection(mut self, selection: Vec<Location>) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_distance(mut self, distance: usize) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_scroll_target(mut self, item: Option<Location>) -> Self {
        self.scroll_target = item;
        self
    }
}

/// How `open_location` picks the window to open in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OpenMode {
    /// Follow the window kind and the `always_use_browser` preference.
    #[default]
    AccordingToMode,
    /// Present (or create) a spatial window for the location.
    InSpatial,
    /// Always open a new navigation window.
    InNavigation,
}

/// Modifiers for `open_location`. `new_window` and `new_tab` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenFlags {
    pub new_window: bool,
    pub new_tab: bool,
    /// Close the source spatial window once the target window is shown.
    pub close_behind: bool,
}

impl OpenFlags {
    pub fn new_tab() -> Self {
        Self {
            new_tab: true,
            ..Self::default()
        }
    }

    pub fn new_window() -> Self {
        Self {
            new_window: true,
            ..Self::default()
        }
    }

    pub fn close_behind() -> Self {
        Self {
            close_behind: true,
            ..Self::default()
        }
    }
}
