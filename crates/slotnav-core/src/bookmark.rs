//! History bookmarks.

use serde::Serialize;
use slotnav_types::Location;

/// A remembered location: where it is, what to call it, and which item was
/// first visible when it was last left.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bookmark {
    location: Location,
    display_name: String,
    scroll_position: Option<Location>,
}

impl Bookmark {
    pub fn new(location: Location) -> Self {
        let display_name = location.basename().to_string();
        Self {
            location,
            display_name,
            scroll_position: None,
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn scroll_position(&self) -> Option<&Location> {
        self.scroll_position.as_ref()
    }

    /// Refresh the scroll position just before the bookmark is reused.
    pub fn set_scroll_position(&mut self, item: Option<Location>) {
        self.scroll_position = item;
    }
}
