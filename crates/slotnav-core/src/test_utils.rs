//! Shared test utilities for the controller.
//!
//! Provides a scripted [`FakeView`] and the [`FakeFactory`] that creates
//! it. Every call made on any fake view is recorded in one shared log so
//! tests can assert on what the controller told which view instance.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use slotnav_types::{FileType, Location, NavConfig, ViewKey};
use slotnav_vfs::MemoryVfs;

use crate::controller::TransitionController;
use crate::events::EventLog;
use crate::view::{ContentView, ViewFactory, ViewHandle};

/// How a fake view reacts to `load_location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Post load-underway then load-complete.
    Auto,
    /// Post nothing; the test drives the handle itself.
    Manual,
    /// Post a failure.
    Fail,
}

/// A call the controller made on a fake view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    Load(Location),
    Select(Vec<Location>),
    Stop,
    ScrollTo(Location),
}

type CallLog = Rc<RefCell<Vec<(ViewKey, ViewCall)>>>;
type Modes = Rc<RefCell<HashMap<String, LoadMode>>>;

pub struct FakeView {
    id: String,
    handle: ViewHandle,
    modes: Modes,
    selection: Vec<Location>,
    first_visible: Rc<RefCell<Option<Location>>>,
    calls: CallLog,
}

impl FakeView {
    fn record(&self, call: ViewCall) {
        self.calls.borrow_mut().push((self.handle.key(), call));
    }
}

impl ContentView for FakeView {
    fn view_id(&self) -> &str {
        &self.id
    }

    fn load_location(&mut self, location: &Location) {
        self.record(ViewCall::Load(location.clone()));
        let mode = self
            .modes
            .borrow()
            .get(&self.id)
            .copied()
            .unwrap_or(LoadMode::Auto);
        match mode {
            LoadMode::Auto => {
                self.handle.load_underway();
                self.handle.load_complete();
            },
            LoadMode::Manual => {},
            LoadMode::Fail => self.handle.failed(),
        }
    }

    fn set_selection(&mut self, selection: &[Location]) {
        self.record(ViewCall::Select(selection.to_vec()));
        self.selection = selection.to_vec();
    }

    fn selection(&self) -> Vec<Location> {
        self.selection.clone()
    }

    fn stop_loading(&mut self) {
        self.record(ViewCall::Stop);
    }

    fn first_visible_item(&self) -> Option<Location> {
        self.first_visible.borrow().clone()
    }

    fn scroll_to_item(&mut self, item: &Location) {
        self.record(ViewCall::ScrollTo(item.clone()));
    }
}

/// Creates [`FakeView`]s. Views support directories only.
pub struct FakeFactory {
    known: Vec<String>,
    /// Ids reported as supported that cannot be instantiated.
    phantom: Vec<String>,
    modes: Modes,
    created: Vec<(String, ViewKey)>,
    handles: Vec<ViewHandle>,
    first_visible: Rc<RefCell<Option<Location>>>,
    calls: CallLog,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self {
            known: ["icon-view", "list-view", "desktop-icon-view"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            phantom: Vec::new(),
            modes: Rc::new(RefCell::new(HashMap::new())),
            created: Vec::new(),
            handles: Vec::new(),
            first_visible: Rc::new(RefCell::new(None)),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Change how later loads of `view_id` instances behave, including
    /// instances that already exist.
    pub fn set_mode(&mut self, view_id: &str, mode: LoadMode) {
        self.modes.borrow_mut().insert(view_id.to_string(), mode);
    }

    pub fn add_phantom(&mut self, view_id: &str) {
        self.phantom.push(view_id.to_string());
    }

    /// Item every fake view reports as first visible.
    pub fn set_first_visible(&self, item: Option<Location>) {
        *self.first_visible.borrow_mut() = item;
    }

    /// `(view id, key)` of every view created so far.
    pub fn created(&self) -> &[(String, ViewKey)] {
        &self.created
    }

    pub fn handle(&self, key: ViewKey) -> Option<ViewHandle> {
        self.handles.iter().find(|h| h.key() == key).cloned()
    }

    pub fn last_handle(&self) -> Option<ViewHandle> {
        self.handles.last().cloned()
    }

    pub fn calls(&self) -> Vec<(ViewKey, ViewCall)> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, key: ViewKey) -> Vec<ViewCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, call)| call.clone())
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl ViewFactory for FakeFactory {
    fn create_view(&mut self, view_id: &str, handle: ViewHandle) -> Option<Box<dyn ContentView>> {
        if !self.known.iter().any(|k| k == view_id) {
            return None;
        }
        self.created.push((view_id.to_string(), handle.key()));
        self.handles.push(handle.clone());
        Some(Box::new(FakeView {
            id: view_id.to_string(),
            handle,
            modes: Rc::clone(&self.modes),
            selection: Vec::new(),
            first_visible: Rc::clone(&self.first_visible),
            calls: Rc::clone(&self.calls),
        }))
    }

    fn view_supports(&self, view_id: &str, _: &Location, file_type: FileType, _: &str) -> bool {
        file_type == FileType::Directory
            && (self.known.iter().any(|k| k == view_id)
                || self.phantom.iter().any(|k| k == view_id))
    }
}

pub type TestController = TransitionController<MemoryVfs, FakeFactory>;

pub fn loc(path: &str) -> Location {
    Location::parse(path).unwrap()
}

/// A provider with a small home tree and an unmounted USB volume.
pub fn demo_vfs() -> MemoryVfs {
    let mut vfs = MemoryVfs::new();
    vfs.mkdir("/home/user/docs/reports").unwrap();
    vfs.mkdir("/home/user/music").unwrap();
    vfs.write("/home/user/notes.txt", "text/plain").unwrap();
    vfs.mkdir("/tmp").unwrap();
    vfs.add_mount("usb", "/mnt/usb", false, &["x-content/image-dcf", "x-content/blank-cd"])
        .unwrap();
    vfs
}

/// A controller over [`demo_vfs`] with an attached event log.
pub fn controller() -> (TestController, EventLog) {
    controller_with(NavConfig::default())
}

pub fn controller_with(config: NavConfig) -> (TestController, EventLog) {
    let mut ctl = TransitionController::new(config, demo_vfs(), FakeFactory::new());
    let log = EventLog::new();
    ctl.add_observer(Box::new(log.clone()));
    (ctl, log)
}

/// Answer provider requests and deliver messages until both are idle.
pub fn settle(ctl: &mut TestController) {
    for _ in 0..1000 {
        let answered = ctl.provider_mut().run_pending();
        let delivered = ctl.poll();
        if answered == 0 && delivered == 0 {
            return;
        }
    }
    panic!("controller did not settle");
}
