//! Window kinds and the transition policy each one implies.

use serde::Serialize;
use slotnav_types::NavConfig;

/// The closed set of window kinds. Behavior differences are expressed as
/// capability queries rather than per-kind code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindowKind {
    /// Browser-style window with tabs and back/forward history.
    Navigation,
    /// One window per folder; opening a folder opens another window.
    Spatial,
    /// The desktop background.
    Desktop,
}

impl WindowKind {
    pub fn supports_back_forward(self) -> bool {
        self == WindowKind::Navigation
    }

    pub fn supports_tabs(self) -> bool {
        self == WindowKind::Navigation
    }

    /// Whether opening a location from this window targets another window.
    pub fn opens_new_window_on_select(self) -> bool {
        matches!(self, WindowKind::Spatial | WindowKind::Desktop)
    }

    /// Whether `close_behind` applies to this window.
    pub fn closes_behind(self) -> bool {
        self == WindowKind::Spatial
    }

    /// Whether this window restores per-location state (scroll position)
    /// before it is first shown.
    pub fn restores_location_state(self) -> bool {
        self == WindowKind::Spatial
    }

    /// Whether losing the viewed location moves to an ancestor (`true`) or
    /// closes the window (`false`).
    pub fn follows_lost_location(self) -> bool {
        self == WindowKind::Navigation
    }

    /// View id every location is displayed with, overriding resolution.
    pub fn forced_view(self, config: &NavConfig) -> Option<&str> {
        match self {
            WindowKind::Desktop => Some(config.desktop_view.as_str()),
            WindowKind::Navigation | WindowKind::Spatial => None,
        }
    }
}
