//! Outward notifications.
//!
//! The controller calls every registered [`NavObserver`] synchronously, and
//! only once the slot it reports on is in a consistent state.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use slotnav_types::{FileError, Location, MountInfo, SlotId, WindowId};

use crate::policy::WindowKind;

/// Which stage a reported display failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// No view could be chosen; no view was created.
    ViewSelection,
    /// The view showing the current location failed and was torn down.
    CurrentView,
    /// A freshly created view failed while starting to load.
    NascentView,
}

/// A failure to show to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFailure {
    pub slot: SlotId,
    pub kind: FailureKind,
    pub message: String,
    pub detail: String,
    /// Underlying provider error, when it differs from what the message
    /// describes (e.g. why a mount failed).
    pub cause: Option<FileError>,
    /// `false` only when the window will be closed because of this failure.
    pub recoverable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    WindowOpened {
        window: WindowId,
        kind: WindowKind,
    },
    WindowClosed {
        window: WindowId,
    },
    SlotOpened {
        window: WindowId,
        slot: SlotId,
        position: usize,
    },
    SlotClosed {
        window: WindowId,
        slot: SlotId,
    },
    /// The active slot of `window` now shows (or is loading) `location`.
    LocationChanged {
        window: WindowId,
        slot: SlotId,
        location: Location,
    },
    SelectionChanged {
        slot: SlotId,
    },
    /// Whether a stop action makes sense for the slot.
    LoadingChanged {
        slot: SlotId,
        allow_stop: bool,
    },
    HistoryChanged {
        slot: SlotId,
        can_go_back: bool,
        can_go_forward: bool,
        can_go_up: bool,
    },
    DisplayFailure(DisplayFailure),
    /// The slot entered the trash.
    TrashBar {
        slot: SlotId,
    },
    /// The slot entered removable media with actionable content.
    MediaDetected {
        slot: SlotId,
        mount: MountInfo,
        content_types: Vec<String>,
    },
}

/// Receives [`NavEvent`]s from the controller.
pub trait NavObserver {
    fn notify(&mut self, event: &NavEvent);
}

/// Observer that records every event. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<NavEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every event recorded so far.
    pub fn events(&self) -> Vec<NavEvent> {
        self.events.borrow().clone()
    }

    /// Remove and return every event recorded so far.
    pub fn take(&self) -> Vec<NavEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Recorded display failures, in order.
    pub fn failures(&self) -> Vec<DisplayFailure> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                NavEvent::DisplayFailure(f) => Some(f.clone()),
                _ => None,
            })
            .collect()
    }
}

impl NavObserver for EventLog {
    fn notify(&mut self, event: &NavEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
