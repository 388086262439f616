//! User-facing navigation operations built on `begin_transition`.

use slotnav_types::{Location, METADATA_KEY_DEFAULT_VIEW, NavError, Result, SlotId, WindowId};
use slotnav_vfs::FileProvider;

use super::TransitionController;
use crate::history::Direction;
use crate::policy::WindowKind;
use crate::request::{ChangeType, LocationRequest, OpenFlags, OpenMode};
use crate::slot::Phase;
use crate::view::{Incoming, ViewFactory};

impl<P: FileProvider, F: ViewFactory> TransitionController<P, F> {
    /// Open `location` starting from `slot`, in the window (and slot) that
    /// `mode`, `flags` and the source window's kind select. Returns the slot
    /// that will show the location.
    pub fn open_location(
        &mut self,
        slot: SlotId,
        location: Location,
        mode: OpenMode,
        flags: OpenFlags,
        selection: Vec<Location>,
    ) -> Result<SlotId> {
        if flags.new_window && flags.new_tab {
            return Err(NavError::Unsupported(
                "cannot open in a new window and a new tab at once".to_string(),
            ));
        }
        let source = self.slot_ref(slot)?.window;
        let source_kind = self
            .windows
            .get(&source)
            .map(|w| w.kind())
            .ok_or(NavError::UnknownWindow(source))?;

        let mut do_load = true;
        let target_window = match mode {
            OpenMode::AccordingToMode if self.config.always_use_browser => {
                if source_kind.opens_new_window_on_select() || flags.new_window {
                    self.open_window(WindowKind::Navigation).0
                } else {
                    source
                }
            },
            OpenMode::AccordingToMode if source_kind.opens_new_window_on_select() => {
                let (window, existing) = self.present_spatial_window(&location);
                do_load = !existing;
                window
            },
            OpenMode::AccordingToMode if flags.new_window => {
                self.open_window(WindowKind::Navigation).0
            },
            OpenMode::AccordingToMode => source,
            OpenMode::InSpatial => {
                let (window, existing) = self.present_spatial_window(&location);
                do_load = !existing;
                window
            },
            OpenMode::InNavigation => self.open_window(WindowKind::Navigation).0,
        };

        let target_slot = if target_window == source {
            if flags.new_tab && source_kind.supports_tabs() {
                self.open_slot(source)?
            } else {
                slot
            }
        } else {
            self.windows
                .get(&target_window)
                .and_then(|w| w.active_slot())
                .ok_or(NavError::UnknownWindow(target_window))?
        };

        if flags.close_behind && source_kind.closes_behind() && target_window != source {
            self.close_behind(source, target_window)?;
        }

        if !do_load {
            log::debug!("{location} already shown in {target_window}");
            return Ok(target_slot);
        }
        let unchanged = target_slot == slot
            && self
                .slots
                .get(&slot)
                .and_then(|s| s.location())
                .is_some_and(|current| current == &location);
        if unchanged {
            return Ok(slot);
        }

        let request = LocationRequest::new(location, ChangeType::Standard).with_selection(selection);
        self.begin_transition(target_slot, request)?;
        Ok(target_slot)
    }

    /// A spatial window for `location`: an existing one already showing it
    /// (`true`), or a new one.
    fn present_spatial_window(&mut self, location: &Location) -> (WindowId, bool) {
        let existing = self.windows.values().find(|w| {
            w.kind() == WindowKind::Spatial
                && w.active_slot()
                    .and_then(|s| self.slots.get(&s))
                    .and_then(|s| s.displayed_or_pending())
                    .is_some_and(|shown| shown == location)
        });
        match existing.map(|w| w.id()) {
            Some(id) => (id, true),
            None => (self.open_window(WindowKind::Spatial).0, false),
        }
    }

    /// Close `source` now if `target` is visible, else once it is shown.
    fn close_behind(&mut self, source: WindowId, target: WindowId) -> Result<()> {
        let w = self
            .windows
            .get_mut(&target)
            .ok_or(NavError::UnknownWindow(target))?;
        if w.is_shown() {
            self.close_window(source)
        } else {
            w.close_when_shown(source);
            Ok(())
        }
    }

    pub fn go_to(&mut self, slot: SlotId, location: Location, new_tab: bool) -> Result<SlotId> {
        let flags = OpenFlags {
            new_tab,
            ..OpenFlags::default()
        };
        self.open_location(slot, location, OpenMode::AccordingToMode, flags, Vec::new())
    }

    pub fn go_home(&mut self, slot: SlotId, new_tab: bool) -> Result<SlotId> {
        let home = self.config.home_location()?;
        self.go_to(slot, home, new_tab)
    }

    /// Open the parent of the current location with the child selected.
    /// Does nothing at the root.
    pub fn go_up(&mut self, slot: SlotId, flags: OpenFlags) -> Result<SlotId> {
        let current = self
            .slot_ref(slot)?
            .location()
            .cloned()
            .ok_or(NavError::NoLocation(slot))?;
        let Some(parent) = current.parent() else {
            return Ok(slot);
        };
        self.open_location(slot, parent, OpenMode::AccordingToMode, flags, vec![current])
    }

    /// Move `distance + 1` entries through the history. `distance` is
    /// clamped to the list; an empty list does nothing. With `new_tab` the
    /// entry opens in a new slot and this slot's history is left alone.
    pub fn go_back_or_forward(
        &mut self,
        slot: SlotId,
        direction: Direction,
        distance: usize,
        new_tab: bool,
    ) -> Result<SlotId> {
        let Some((distance, bookmark)) = self.slot_ref(slot)?.history.get(direction, distance)
        else {
            return Ok(slot);
        };
        let target = bookmark.location().clone();
        let scroll = bookmark.scroll_position().cloned();
        if new_tab {
            return self.open_location(
                slot,
                target,
                OpenMode::AccordingToMode,
                OpenFlags::new_tab(),
                Vec::new(),
            );
        }
        let request = LocationRequest::new(target, direction.change_type())
            .with_distance(distance)
            .with_scroll_target(scroll);
        self.begin_transition(slot, request)?;
        Ok(slot)
    }

    pub fn go_back(&mut self, slot: SlotId) -> Result<SlotId> {
        self.go_back_or_forward(slot, Direction::Back, 0, false)
    }

    pub fn go_forward(&mut self, slot: SlotId) -> Result<SlotId> {
        self.go_back_or_forward(slot, Direction::Forward, 0, false)
    }

    /// Redisplay the current location, keeping selection and scroll.
    pub fn reload(&mut self, slot: SlotId) -> Result<()> {
        let s = self.slot_ref(slot)?;
        let Some(location) = s.location().cloned() else {
            return Ok(());
        };
        let request = LocationRequest::new(location, ChangeType::Reload)
            .with_selection(s.selection())
            .with_scroll_target(s.first_visible_item());
        self.begin_transition(slot, request)
    }

    /// Stop both views and abandon the pending transition.
    pub fn stop_loading(&mut self, slot: SlotId) -> Result<()> {
        let s = self.slot_mut(slot)?;
        if let Some(current) = s.current_view.as_mut() {
            current.view.stop_loading();
        }
        if let Some(Incoming::Fresh(bound)) = s.incoming.as_mut() {
            bound.view.stop_loading();
        }
        self.cancel_location_change(slot);
        Ok(())
    }

    /// Remember `view_id` as the preferred view of the current location and
    /// switch to it.
    pub fn set_content_view(&mut self, slot: SlotId, view_id: &str) -> Result<()> {
        let location = self
            .slot_ref(slot)?
            .location()
            .cloned()
            .ok_or(NavError::NoLocation(slot))?;
        if self.slot_ref(slot)?.view_id() == Some(view_id) {
            return Ok(());
        }
        if let Err(e) = self
            .provider
            .set_metadata(&location, METADATA_KEY_DEFAULT_VIEW, Some(view_id))
        {
            log::warn!("{slot}: view preference for {location} not saved: {e}");
        }

        self.end_location_change(slot);
        self.set_allow_stop(slot, true);
        let s = self.slot_mut(slot)?;
        let selection = s.selection();
        let scroll = if selection.is_empty() {
            s.first_visible_item()
        } else {
            None
        };
        s.pending_scroll_to = scroll.clone();
        s.pending = Some(
            LocationRequest::new(location, ChangeType::Reload)
                .with_selection(selection)
                .with_scroll_target(scroll),
        );
        s.phase = Phase::ResolvingView;
        self.create_content_view(slot, view_id);
        Ok(())
    }
}
