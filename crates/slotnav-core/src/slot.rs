//! Per-slot transition state.
//!
//! The controller owns every [`Slot`] and is the only code that mutates
//! one; the fields are crate-visible for that reason. Outside the crate a
//! slot is read through its getters or a serializable [`SlotSnapshot`].

use serde::Serialize;
use slotnav_types::{CancelToken, Location, OpId, SlotId, WindowId};

use crate::bookmark::Bookmark;
use crate::history::History;
use crate::request::{ChangeType, LocationRequest};
use crate::view::{BoundView, Incoming};

/// Where a slot is in its transition state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    #[default]
    Idle,
    ResolvingMetadata,
    Mounting,
    ResolvingView,
    Loading,
}

/// Identity of an outstanding provider operation.
#[derive(Debug, Clone)]
pub(crate) struct PendingOp {
    pub id: OpId,
    pub token: CancelToken,
}

impl PendingOp {
    pub fn cancel(&self) {
        self.token.cancel();
    }
}

/// Subscription to the entity behind the current location.
#[derive(Debug, Clone)]
pub(crate) struct ViewedFile {
    pub location: Location,
    pub op: PendingOp,
    /// Whether the entity was known to exist; a loss is only acted on if so.
    pub seen: bool,
    pub in_trash: bool,
}

#[derive(Debug)]
pub struct Slot {
    pub(crate) id: SlotId,
    pub(crate) window: WindowId,
    pub(crate) location: Option<Location>,
    pub(crate) pending: Option<LocationRequest>,
    pub(crate) current_view: Option<BoundView>,
    pub(crate) incoming: Option<Incoming>,
    pub(crate) history: History,
    pub(crate) current_bookmark: Option<Bookmark>,
    pub(crate) last_bookmark: Option<Bookmark>,
    pub(crate) viewed: Option<ViewedFile>,
    pub(crate) metadata_op: Option<PendingOp>,
    pub(crate) mount_op: Option<PendingOp>,
    pub(crate) find_mount_op: Option<PendingOp>,
    /// Scroll target carried past commit until the load completes.
    pub(crate) pending_scroll_to: Option<Location>,
    pub(crate) allow_stop: bool,
    pub(crate) phase: Phase,
}

impl Slot {
    pub(crate) fn new(id: SlotId, window: WindowId) -> Self {
        Self {
            id,
            window,
            location: None,
            pending: None,
            current_view: None,
            incoming: None,
            history: History::new(),
            current_bookmark: None,
            last_bookmark: None,
            viewed: None,
            metadata_op: None,
            mount_op: None,
            find_mount_op: None,
            pending_scroll_to: None,
            allow_stop: false,
            phase: Phase::Idle,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn pending(&self) -> Option<&LocationRequest> {
        self.pending.as_ref()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn allow_stop(&self) -> bool {
        self.allow_stop
    }

    pub fn current_bookmark(&self) -> Option<&Bookmark> {
        self.current_bookmark.as_ref()
    }

    pub fn last_bookmark(&self) -> Option<&Bookmark> {
        self.last_bookmark.as_ref()
    }

    /// Id of the view showing the current location.
    pub fn view_id(&self) -> Option<&str> {
        self.current_view.as_ref().map(BoundView::view_id)
    }

    /// Id of the view a pending transition will switch to.
    pub fn incoming_view_id(&self) -> Option<&str> {
        match self.incoming.as_ref()? {
            Incoming::Reused => self.view_id(),
            Incoming::Fresh(bound) => Some(bound.view_id()),
        }
    }

    /// Selection of the current view.
    pub fn selection(&self) -> Vec<Location> {
        self.current_view
            .as_ref()
            .map(|bound| bound.view.selection())
            .unwrap_or_default()
    }

    pub(crate) fn first_visible_item(&self) -> Option<Location> {
        self.current_view
            .as_ref()
            .and_then(|bound| bound.view.first_visible_item())
    }

    /// Pending target, or else the current location.
    pub fn displayed_or_pending(&self) -> Option<&Location> {
        self.pending
            .as_ref()
            .map(|req| &req.target)
            .or(self.location.as_ref())
    }

    /// Make `location` the displayed one. The current bookmark is only
    /// replaced when the location actually changes; the old one becomes
    /// `last_bookmark`.
    pub(crate) fn set_displayed_location(&mut self, location: &Location) {
        let unchanged = self
            .current_bookmark
            .as_ref()
            .is_some_and(|bm| bm.location() == location);
        if unchanged {
            self.last_bookmark = self.current_bookmark.clone();
            return;
        }
        self.last_bookmark = self.current_bookmark.take();
        self.current_bookmark = Some(Bookmark::new(location.clone()));
    }

    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            id: self.id.0,
            window: self.window.0,
            location: self.location.clone(),
            view: self.view_id().map(str::to_string),
            phase: self.phase,
            pending: self.pending.as_ref().map(|req| PendingSnapshot {
                target: req.target.clone(),
                change_type: req.change_type,
            }),
            history: self.history.clone(),
            allow_stop: self.allow_stop,
        }
    }
}

/// Serializable view of a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotSnapshot {
    pub id: u64,
    pub window: u64,
    pub location: Option<Location>,
    pub view: Option<String>,
    pub phase: Phase,
    pub pending: Option<PendingSnapshot>,
    pub history: History,
    pub allow_stop: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingSnapshot {
    pub target: Location,
    pub change_type: ChangeType,
}
