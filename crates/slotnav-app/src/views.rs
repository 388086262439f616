//! Views that log what they are asked to display.

use slotnav_core::{ContentView, ViewFactory, ViewHandle};
use slotnav_types::{FileType, Location};

const VIEW_IDS: [&str; 3] = ["icon-view", "list-view", "desktop-icon-view"];

/// Finishes every load immediately.
pub struct LoggingView {
    id: String,
    handle: ViewHandle,
    location: Option<Location>,
    selection: Vec<Location>,
}

impl ContentView for LoggingView {
    fn view_id(&self) -> &str {
        &self.id
    }

    fn load_location(&mut self, location: &Location) {
        log::info!("[{} {}] loading {location}", self.id, self.handle.key());
        self.location = Some(location.clone());
        self.selection.clear();
        self.handle.load_underway();
        self.handle.load_complete();
    }

    fn set_selection(&mut self, selection: &[Location]) {
        self.selection = selection.to_vec();
        if !selection.is_empty() {
            self.handle.selection_changed();
        }
    }

    fn selection(&self) -> Vec<Location> {
        self.selection.clone()
    }

    fn stop_loading(&mut self) {
        if let Some(location) = &self.location {
            log::debug!("[{} {}] stopped loading {location}", self.id, self.handle.key());
        }
    }

    fn first_visible_item(&self) -> Option<Location> {
        self.selection.first().cloned()
    }

    fn scroll_to_item(&mut self, item: &Location) {
        log::info!("[{} {}] scrolled to {item}", self.id, self.handle.key());
    }
}

/// Creates [`LoggingView`]s for directories.
#[derive(Debug, Default)]
pub struct LoggingViewFactory {
    created: usize,
}

impl LoggingViewFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> usize {
        self.created
    }
}

impl ViewFactory for LoggingViewFactory {
    fn create_view(&mut self, view_id: &str, handle: ViewHandle) -> Option<Box<dyn ContentView>> {
        if !VIEW_IDS.contains(&view_id) {
            return None;
        }
        self.created += 1;
        Some(Box::new(LoggingView {
            id: view_id.to_string(),
            handle,
            location: None,
            selection: Vec::new(),
        }))
    }

    fn view_supports(&self, view_id: &str, _: &Location, file_type: FileType, _: &str) -> bool {
        file_type == FileType::Directory && VIEW_IDS.contains(&view_id)
    }
}
