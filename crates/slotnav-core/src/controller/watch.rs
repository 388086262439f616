//! Tracking the entity behind the current location, and the enclosing
//! volume lookup done after a real location change.

use slotnav_types::{FileChange, Location, MountInfo, OpId, OpKind, SlotId};
use slotnav_vfs::FileProvider;

use super::{TransitionController, is_fresh};
use crate::events::NavEvent;
use crate::request::{ChangeType, LocationRequest};
use crate::slot::ViewedFile;
use crate::view::ViewFactory;

/// Content types that never warrant a removable-media prompt.
const IGNORED_CONTENT_PREFIXES: [&str; 2] = ["x-content/blank-", "x-content/win32-software"];

impl<P: FileProvider, F: ViewFactory> TransitionController<P, F> {
    /// Subscribe to changes of `location`, replacing any earlier watch.
    pub(super) fn watch_viewed(&mut self, slot: SlotId, location: &Location) {
        let op = self.new_op();
        let ticket = self.ticket(slot, &op, OpKind::Watch);
        let seen = self.provider.exists(location);
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        if let Some(old) = s.viewed.take() {
            old.op.cancel();
        }
        s.viewed = Some(ViewedFile {
            location: location.clone(),
            op,
            seen,
            in_trash: location.is_in_trash(),
        });
        self.provider.watch(location, ticket);
    }

    /// Watch the current location again if nothing is watching it.
    pub(super) fn ensure_watch(&mut self, slot: SlotId) {
        let location = match self.slots.get(&slot) {
            Some(s) if s.viewed.is_none() => s.location.clone(),
            _ => None,
        };
        if let Some(location) = location {
            self.watch_viewed(slot, &location);
        }
    }

    pub(super) fn on_file_changed(&mut self, slot: SlotId, op: OpId, change: FileChange) {
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        let Some(viewed) = s.viewed.as_mut() else {
            return;
        };
        if !is_fresh(Some(&viewed.op), op) {
            log::debug!("{slot}: change from stale watch {op} dropped");
            return;
        }
        match change {
            FileChange::Changed => viewed.seen = true,
            FileChange::Gone => {
                if viewed.seen {
                    self.on_location_lost(slot);
                }
            },
            FileChange::MovedToTrash => {
                if viewed.seen && !viewed.in_trash {
                    self.on_location_lost(slot);
                }
            },
            FileChange::Renamed(to) => {
                log::debug!("{slot}: {} renamed to {to}", viewed.location);
                viewed.location = to.clone();
                viewed.in_trash = to.is_in_trash();
                s.location = Some(to.clone());
                let window = s.window;
                let active = self
                    .windows
                    .get(&window)
                    .is_some_and(|w| w.active_slot() == Some(slot));
                if active {
                    self.emit(NavEvent::LocationChanged {
                        window,
                        slot,
                        location: to,
                    });
                }
            },
        }
    }

    /// The viewed location was deleted or trashed. Navigation windows move
    /// to the nearest surviving ancestor (or home); other windows close.
    fn on_location_lost(&mut self, slot: SlotId) {
        let Some(s) = self.slots.get(&slot) else {
            return;
        };
        let window = s.window;
        let lost = s.location.clone();
        let follows = self
            .windows
            .get(&window)
            .is_some_and(|w| w.kind().follows_lost_location());
        log::info!(
            "{slot}: viewed location {} is gone",
            lost.as_ref().map_or_else(String::new, Location::uri)
        );
        self.end_location_change(slot);

        if !follows {
            if let Err(e) = self.close_window(window) {
                log::debug!("{window}: already closed: {e}");
            }
            return;
        }

        let mut target = lost.as_ref().and_then(Location::parent);
        while let Some(candidate) = target.take() {
            if self.provider.exists(&candidate) {
                target = Some(candidate);
                break;
            }
            target = candidate.parent();
        }
        let target = match target {
            Some(t) => t,
            None => match self.config.home_location() {
                Ok(home) => home,
                Err(e) => {
                    log::warn!("{slot}: no place to go: {e}");
                    return;
                },
            },
        };
        let request = LocationRequest::new(target, ChangeType::Standard);
        if let Err(e) = self.begin_transition(slot, request) {
            log::warn!("{slot}: could not leave lost location: {e}");
        }
    }

    /// Look up the volume enclosing `location`.
    pub(super) fn find_mount(&mut self, slot: SlotId, location: &Location) {
        let op = self.new_op();
        let ticket = self.ticket(slot, &op, OpKind::FindMount);
        if let Some(s) = self.slots.get_mut(&slot) {
            if let Some(old) = s.find_mount_op.replace(op) {
                old.cancel();
            }
        }
        self.provider.find_enclosing_mount(location, ticket);
    }

    pub(super) fn on_found_mount(&mut self, slot: SlotId, op: OpId, mount: Option<MountInfo>) {
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        if !is_fresh(s.find_mount_op.as_ref(), op) {
            log::debug!("{slot}: stale mount lookup {op} dropped");
            return;
        }
        s.find_mount_op = None;
        let Some(mount) = mount else {
            return;
        };
        let content_types: Vec<String> = mount
            .content_types
            .iter()
            .filter(|t| !IGNORED_CONTENT_PREFIXES.iter().any(|p| t.starts_with(p)))
            .cloned()
            .collect();
        if content_types.is_empty() {
            return;
        }
        log::debug!("{slot}: media on {}: {content_types:?}", mount.name);
        self.emit(NavEvent::MediaDetected {
            slot,
            mount,
            content_types,
        });
    }
}
