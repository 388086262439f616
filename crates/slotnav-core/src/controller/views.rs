//! View lifecycle: creation or reuse, commit on load-underway, completion
//! and failure handling.

use slotnav_types::{FileError, FileInfo, Location, SlotId, ViewEvent, ViewKey, ViewSignal};
use slotnav_vfs::FileProvider;

use super::TransitionController;
use crate::events::{DisplayFailure, FailureKind, NavEvent};
use crate::failure::{CURRENT_VIEW_DETAIL, NASCENT_VIEW_DETAIL};
use crate::request::{ChangeType, LocationRequest};
use crate::slot::{Phase, Slot};
use crate::view::{BoundView, Incoming, ViewFactory, ViewHandle};

fn is_current(s: &Slot, key: ViewKey) -> bool {
    s.current_view.as_ref().is_some_and(|b| b.key == key)
}

/// Whether `key` is the view the pending transition switches to.
fn is_incoming(s: &Slot, key: ViewKey) -> bool {
    match s.incoming.as_ref() {
        Some(Incoming::Fresh(bound)) => bound.key == key,
        Some(Incoming::Reused) => is_current(s, key),
        None => false,
    }
}

impl<P: FileProvider, F: ViewFactory> TransitionController<P, F> {
    /// Bind the view `view_id` as the incoming view of `slot` and tell it to
    /// load the pending target.
    pub(super) fn create_content_view(&mut self, slot: SlotId, view_id: &str) {
        let Some(window) = self.window_of(slot) else {
            return;
        };
        let view_id = window
            .kind()
            .forced_view(&self.config)
            .unwrap_or(view_id)
            .to_string();

        let Some(s) = self.slots.get(&slot) else {
            return;
        };
        let Some(request) = s.pending.as_ref() else {
            log::debug!("{slot}: no pending transition for {view_id}");
            return;
        };
        let target = request.target.clone();
        let selection = request.selection.clone();
        let reuse = s.current_view.as_ref().is_some_and(|b| b.view_id() == view_id);

        let incoming = if reuse {
            log::debug!("{slot}: reusing {view_id}");
            Incoming::Reused
        } else {
            let key = self.new_view_key();
            let handle = ViewHandle::new(slot, key, self.mailbox.sender());
            match self.factory.create_view(&view_id, handle) {
                Some(view) => {
                    log::debug!("{slot}: created {view_id} as {key}");
                    Incoming::Fresh(BoundView { key, view })
                },
                None => {
                    let error = FileError::Other(format!("unknown view \"{view_id}\""));
                    self.view_selection_failed(slot, &FileInfo::unknown(&target), Some(&error));
                    return;
                },
            }
        };

        if let Some(s) = self.slots.get_mut(&slot) {
            s.incoming = Some(incoming);
            s.phase = Phase::Loading;
        }
        self.load_new_location(slot, &target, &selection, false, true);
    }

    /// Tell the current and/or incoming view to load `location`.
    fn load_new_location(
        &mut self,
        slot: SlotId,
        location: &Location,
        selection: &[Location],
        tell_current: bool,
        tell_new: bool,
    ) {
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        let mut told_current = false;
        if tell_new {
            match s.incoming.as_mut() {
                Some(Incoming::Fresh(bound)) => {
                    bound.view.load_location(location);
                    bound.view.set_selection(selection);
                },
                Some(Incoming::Reused) => {
                    if let Some(current) = s.current_view.as_mut() {
                        current.view.load_location(location);
                        current.view.set_selection(selection);
                        told_current = true;
                    }
                },
                None => {},
            }
        }
        if tell_current && !told_current {
            if let Some(current) = s.current_view.as_mut() {
                current.view.load_location(location);
                current.view.set_selection(selection);
            }
        }
    }

    pub(super) fn on_view_signal(&mut self, signal: ViewSignal) {
        let ViewSignal { slot, view, event } = signal;
        if !self.slots.contains_key(&slot) {
            log::debug!("{slot}: {event:?} from {view} after close dropped");
            return;
        }
        match event {
            ViewEvent::LoadUnderway => self.on_load_underway(slot, view),
            ViewEvent::LoadComplete => self.on_load_complete(slot, view),
            ViewEvent::Failed => self.on_view_failed(slot, view),
            ViewEvent::SelectionChanged => {
                if self.slots.get(&slot).is_some_and(|s| is_current(s, view)) {
                    self.emit(NavEvent::SelectionChanged { slot });
                }
            },
        }
    }

    fn on_load_underway(&mut self, slot: SlotId, key: ViewKey) {
        let Some(s) = self.slots.get(&slot) else {
            return;
        };
        if is_incoming(s, key) && s.pending.is_some() {
            self.commit(slot);
        } else if is_current(s, key) {
            self.set_allow_stop(slot, true);
        } else {
            log::debug!("{slot}: load-underway from stale {key} ignored");
        }
    }

    /// The incoming view has started showing the target: make the pending
    /// transition the slot's current state.
    fn commit(&mut self, slot: SlotId) {
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        if let Some(Incoming::Fresh(bound)) = s.incoming.take() {
            if let Some(mut old) = s.current_view.replace(bound) {
                old.view.stop_loading();
            }
        }
        let request = s.pending.take();
        if let Some(request) = request {
            self.update_for_new_location(slot, request);
        }
        self.free_location_change(slot);

        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        s.phase = Phase::Loading;
        let window = s.window;
        let location = s.location.clone();
        let active = self
            .windows
            .get(&window)
            .is_some_and(|w| w.active_slot() == Some(slot));
        if let (true, Some(location)) = (active, location) {
            self.emit(NavEvent::LocationChanged {
                window,
                slot,
                location,
            });
        }
    }

    fn update_for_new_location(&mut self, slot: SlotId, request: LocationRequest) {
        let back_forward = self
            .window_of(slot)
            .is_some_and(|w| w.kind().supports_back_forward());
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        let new_location = request.target;
        let leaving = s.location.clone();

        s.set_displayed_location(&new_location);
        let last = s.last_bookmark.take();
        if back_forward {
            if let Err(e) = s.history.record(
                request.change_type,
                request.distance,
                leaving.as_ref(),
                last,
                &new_location,
            ) {
                log::warn!("{slot}: history not updated: {e}");
            }
        }

        let really_changed = leaving.as_ref() != Some(&new_location);
        s.location = Some(new_location.clone());
        let history = NavEvent::HistoryChanged {
            slot,
            can_go_back: s.history.can_go_back(),
            can_go_forward: s.history.can_go_forward(),
            can_go_up: new_location.parent().is_some(),
        };
        log::info!("{slot}: now showing {new_location}");

        self.watch_viewed(slot, &new_location);
        self.emit(history);
        if really_changed {
            if new_location.is_in_trash() {
                self.emit(NavEvent::TrashBar { slot });
            }
            self.find_mount(slot, &new_location);
        }
    }

    fn on_load_complete(&mut self, slot: SlotId, key: ViewKey) {
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        if !is_current(s, key) || s.pending.is_some() {
            log::debug!("{slot}: load-complete from {key} ignored");
            return;
        }
        if let Some(item) = s.pending_scroll_to.take() {
            if let Some(current) = s.current_view.as_mut() {
                current.view.scroll_to_item(&item);
            }
        }
        self.end_location_change(slot);
    }

    fn on_view_failed(&mut self, slot: SlotId, key: ViewKey) {
        let shown = self.window_of(slot).is_some_and(|w| w.is_shown());
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        let mut fallback = None;
        let mut close = false;
        let failure = if is_current(s, key) {
            let Some(mut bound) = s.current_view.take() else {
                return;
            };
            bound.view.stop_loading();
            let view_id = bound.view_id().to_string();
            log::warn!("{slot}: current view {view_id} failed");
            Some(DisplayFailure {
                slot,
                kind: FailureKind::CurrentView,
                message: self.factory.startup_error_label(&view_id),
                detail: CURRENT_VIEW_DETAIL.to_string(),
                cause: None,
                recoverable: true,
            })
        } else if is_incoming(s, key) {
            let Some(request) = s.pending.as_ref() else {
                return;
            };
            let view_id = s.incoming_view_id().unwrap_or_default().to_string();
            log::warn!("{slot}: {view_id} failed to load {}", request.target);
            if request.change_type != ChangeType::Fallback {
                fallback = Some(request.target.clone());
                Some(DisplayFailure {
                    slot,
                    kind: FailureKind::NascentView,
                    message: self.factory.error_label(&view_id),
                    detail: NASCENT_VIEW_DETAIL.to_string(),
                    cause: None,
                    recoverable: true,
                })
            } else {
                close = !shown;
                None
            }
        } else {
            log::debug!("{slot}: failure of stale {key} ignored");
            return;
        };

        self.cancel_location_change(slot);
        if let Some(failure) = failure {
            self.emit(NavEvent::DisplayFailure(failure));
        }
        if let Some(target) = fallback {
            let request = LocationRequest::new(target, ChangeType::Fallback);
            if let Err(e) = self.begin_transition(slot, request) {
                log::warn!("{slot}: fallback not started: {e}");
            }
        }
        if close {
            if let Some(window) = self.slots.get(&slot).map(|s| s.window) {
                if let Err(e) = self.close_window(window) {
                    log::debug!("{window}: already closed: {e}");
                }
            }
        }
    }
}
