//! Metadata results, the single mount retry, and view-selection failures.

use slotnav_types::{
    FileError, FileInfo, FileInfoResult, Location, METADATA_KEY_SCROLL_POSITION, OpId, OpKind,
    SlotId,
};
use slotnav_vfs::FileProvider;

use super::{TransitionController, is_fresh};
use crate::events::{DisplayFailure, FailureKind, NavEvent};
use crate::failure::view_selection_message;
use crate::request::{ChangeType, LocationRequest};
use crate::resolver;
use crate::slot::Phase;
use crate::view::ViewFactory;

/// What to do with a metadata result.
enum Next {
    Mount(Location),
    End,
    ResolveView,
    Fail,
}

impl<P: FileProvider, F: ViewFactory> TransitionController<P, F> {
    pub(super) fn on_metadata(&mut self, slot: SlotId, op: OpId, result: FileInfoResult) {
        let Some(s) = self.slots.get_mut(&slot) else {
            log::debug!("{slot}: metadata for closed slot dropped");
            return;
        };
        if !is_fresh(s.metadata_op.as_ref(), op) {
            log::debug!("{slot}: stale metadata result {op} dropped");
            return;
        }
        s.metadata_op = None;
        self.on_metadata_ready(slot, result);
    }

    fn on_metadata_ready(&mut self, slot: SlotId, result: FileInfoResult) {
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        let Some(request) = s.pending.as_mut() else {
            return;
        };
        let next = match &result.error {
            Some(FileError::NotMounted) if !request.tried_mount => {
                request.tried_mount = true;
                Next::Mount(request.target.clone())
            },
            Some(FileError::Cancelled) => Next::End,
            None | Some(FileError::NotSupported) => Next::ResolveView,
            Some(_) => Next::Fail,
        };

        match next {
            Next::Mount(target) => {
                s.phase = Phase::Mounting;
                self.try_mount(slot, &target);
            },
            Next::End => {
                log::debug!("{slot}: metadata fetch cancelled");
                self.end_location_change(slot);
                self.ensure_watch(slot);
            },
            Next::ResolveView => {
                s.phase = Phase::ResolvingView;
                let target = request.target.clone();
                let change = request.change_type;
                let view_id = resolver::resolve(
                    &target,
                    &result.info,
                    change,
                    &self.config.default_view,
                    &self.factory,
                );
                match view_id {
                    Some(id) => {
                        log::debug!("{slot}: {target} resolved to {id}");
                        self.setup_new_window(slot, &result.info);
                        self.create_content_view(slot, &id);
                    },
                    None => self.view_selection_failed(slot, &result.info, result.error.as_ref()),
                }
            },
            Next::Fail => self.view_selection_failed(slot, &result.info, result.error.as_ref()),
        }
    }

    fn try_mount(&mut self, slot: SlotId, target: &Location) {
        let op = self.new_op();
        let ticket = self.ticket(slot, &op, OpKind::Mount);
        if let Some(s) = self.slots.get_mut(&slot) {
            if let Some(old) = s.mount_op.replace(op) {
                old.cancel();
            }
        }
        log::debug!("{slot}: mounting enclosing volume of {target}");
        self.provider.mount_enclosing_volume(target, ticket);
    }

    pub(super) fn on_mounted(
        &mut self,
        slot: SlotId,
        op: OpId,
        result: std::result::Result<(), FileError>,
    ) {
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        if !is_fresh(s.mount_op.as_ref(), op) {
            log::debug!("{slot}: stale mount result {op} dropped");
            return;
        }
        s.mount_op = None;
        let Some(request) = s.pending.as_mut() else {
            return;
        };
        let target = request.target.clone();
        match result {
            Ok(()) => {
                log::debug!("{slot}: mounted, fetching {target} again");
                s.phase = Phase::ResolvingMetadata;
                self.provider.invalidate(&target);
                self.fetch_metadata(slot, &target);
            },
            Err(FileError::Cancelled) => {
                log::debug!("{slot}: mount cancelled");
                self.end_location_change(slot);
                self.ensure_watch(slot);
            },
            Err(e) => {
                log::debug!("{slot}: mount failed: {e}");
                request.mount_error = Some(e);
                self.on_metadata_ready(slot, FileInfoResult::failed(&target, FileError::NotMounted));
            },
        }
    }

    /// Restore saved per-location state into a spatial window that has not
    /// been shown yet.
    fn setup_new_window(&mut self, slot: SlotId, info: &FileInfo) {
        let restores = self
            .window_of(slot)
            .is_some_and(|w| !w.is_shown() && w.kind().restores_location_state());
        if !restores {
            return;
        }
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        let Some(request) = s.pending.as_mut() else {
            return;
        };
        let scroll_to = match request.selection.first() {
            Some(first) => Some(first.clone()),
            None => info
                .metadata(METADATA_KEY_SCROLL_POSITION)
                .and_then(|saved| Location::parse(saved).ok()),
        };
        if scroll_to.is_some() {
            request.scroll_target = scroll_to.clone();
            s.pending_scroll_to = scroll_to;
        }
    }

    /// No view can display the pending target. Reports the failure and ends
    /// the transition; a window that was never shown is sent somewhere safe
    /// or closed.
    pub(super) fn view_selection_failed(
        &mut self,
        slot: SlotId,
        info: &FileInfo,
        error: Option<&FileError>,
    ) {
        let Some(s) = self.slots.get(&slot) else {
            return;
        };
        let Some(request) = s.pending.as_ref() else {
            return;
        };
        let target = request.target.clone();
        let cause = request.mount_error.clone();
        let window = s.window;
        let shown = self.windows.get(&window).is_some_and(|w| w.is_shown());

        let Some((message, detail)) =
            view_selection_message(&target, info, error, self.config.max_uri_in_dialog)
        else {
            self.end_location_change(slot);
            self.ensure_watch(slot);
            return;
        };
        log::warn!("{slot}: cannot display {target}: {detail}");

        let fallback = if shown || self.windows.len() > 1 {
            None
        } else {
            self.fallback_target(&target)
        };

        self.end_location_change(slot);
        if shown {
            self.ensure_watch(slot);
        }
        self.emit(NavEvent::DisplayFailure(DisplayFailure {
            slot,
            kind: FailureKind::ViewSelection,
            message,
            detail,
            cause,
            recoverable: shown || fallback.is_some(),
        }));

        if shown {
            return;
        }
        match fallback {
            Some(safe) => {
                log::info!("{slot}: falling back to {safe}");
                let request = LocationRequest::new(safe, ChangeType::Fallback);
                if let Err(e) = self.begin_transition(slot, request) {
                    log::warn!("{slot}: fallback not started: {e}");
                }
            },
            None => {
                if let Err(e) = self.close_window(window) {
                    log::debug!("{window}: already closed: {e}");
                }
            },
        }
    }

    /// Where a never-shown window goes after failing to show `failed`: home,
    /// or root when home itself failed. `None` once root has failed.
    fn fallback_target(&self, failed: &Location) -> Option<Location> {
        let root = self
            .config
            .root_location()
            .unwrap_or_else(|_| Location::root());
        if failed == &root {
            return None;
        }
        match self.config.home_location() {
            Ok(home) if &home != failed => Some(home),
            _ => Some(root),
        }
    }
}
