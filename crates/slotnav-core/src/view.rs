//! Content views and the factory that creates them.
//!
//! A view renders one location inside a slot. It never calls back into the
//! controller directly; it reports progress through its [`ViewHandle`],
//! which posts tagged signals into the controller's mailbox.

use std::fmt;
use std::sync::mpsc::Sender;

use slotnav_types::{FileType, Location, Message, SlotId, ViewEvent, ViewKey, ViewSignal};

/// A concrete view bound to a slot.
pub trait ContentView {
    /// Identifier of the view implementation (e.g. `"icon-view"`).
    fn view_id(&self) -> &str;

    /// Start displaying `location`. The view answers with `LoadUnderway`
    /// and later `LoadComplete` (or `Failed`) through its handle.
    fn load_location(&mut self, location: &Location);

    fn set_selection(&mut self, selection: &[Location]);

    fn selection(&self) -> Vec<Location>;

    fn stop_loading(&mut self);

    /// Item currently at the top of the view, if any.
    fn first_visible_item(&self) -> Option<Location>;

    fn scroll_to_item(&mut self, item: &Location);
}

/// Creates views and answers capability queries about view ids.
pub trait ViewFactory {
    /// Instantiate the view `view_id`, or `None` if the id is unknown.
    fn create_view(&mut self, view_id: &str, handle: ViewHandle) -> Option<Box<dyn ContentView>>;

    /// Whether `view_id` can display a location with these properties.
    fn view_supports(&self, view_id: &str, location: &Location, file_type: FileType, mime_type: &str)
    -> bool;

    /// Headline used when a view fails while starting to load.
    fn error_label(&self, view_id: &str) -> String {
        format!("The {view_id} encountered an error.")
    }

    /// Headline used when the view showing the current location fails.
    fn startup_error_label(&self, view_id: &str) -> String {
        format!("The {view_id} encountered an error while starting up.")
    }
}

/// Reporting channel given to a view at creation.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    slot: SlotId,
    key: ViewKey,
    tx: Sender<Message>,
}

impl ViewHandle {
    pub fn new(slot: SlotId, key: ViewKey, tx: Sender<Message>) -> Self {
        Self { slot, key, tx }
    }

    pub fn slot(&self) -> SlotId {
        self.slot
    }

    pub fn key(&self) -> ViewKey {
        self.key
    }

    pub fn load_underway(&self) {
        self.send(ViewEvent::LoadUnderway);
    }

    pub fn load_complete(&self) {
        self.send(ViewEvent::LoadComplete);
    }

    pub fn failed(&self) {
        self.send(ViewEvent::Failed);
    }

    pub fn selection_changed(&self) {
        self.send(ViewEvent::SelectionChanged);
    }

    fn send(&self, event: ViewEvent) {
        let signal = ViewSignal {
            slot: self.slot,
            view: self.key,
            event,
        };
        if self.tx.send(Message::View(signal)).is_err() {
            log::debug!("{}: controller gone, {event:?} dropped", self.key);
        }
    }
}

/// A view instance together with the key its signals are tagged with.
pub struct BoundView {
    pub key: ViewKey,
    pub view: Box<dyn ContentView>,
}

impl BoundView {
    pub fn view_id(&self) -> &str {
        self.view.view_id()
    }
}

impl fmt::Debug for BoundView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundView")
            .field("key", &self.key)
            .field("view_id", &self.view.view_id())
            .finish()
    }
}

/// The view a transition will switch to.
#[derive(Debug)]
pub enum Incoming {
    /// The current view already has the chosen id and is reused.
    Reused,
    /// A new instance, swapped in on commit.
    Fresh(BoundView),
}
