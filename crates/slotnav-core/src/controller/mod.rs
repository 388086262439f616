//! The transition controller: owns every window and slot, issues provider
//! operations, and turns their completions into slot state changes.
//!
//! All work happens on the caller's thread. Operations that take time are
//! issued with a [`Ticket`] and answered through the controller's mailbox;
//! the host drains it with [`TransitionController::poll`]. Every completion
//! and view signal is checked for freshness before it may touch a slot, so
//! results of cancelled or superseded transitions are dropped.
//!
//! Per slot the state machine is
//! `Idle -> ResolvingMetadata -> (Mounting -> ResolvingMetadata) ->
//! ResolvingView -> Loading -> Idle`, with cancellation returning any state
//! to `Idle`.

mod mount;
mod open;
mod views;
mod watch;

use std::collections::BTreeMap;

use slotnav_types::{
    Attributes, CancelToken, Location, Mailbox, Message, NavConfig, NavError, OpId, OpKind,
    Payload, Result, SlotId, Ticket, ViewKey, WindowId,
};
use slotnav_vfs::FileProvider;

use crate::events::{NavEvent, NavObserver};
use crate::policy::WindowKind;
use crate::request::{ChangeType, LocationRequest};
use crate::slot::{PendingOp, Phase, Slot};
use crate::view::{Incoming, ViewFactory};
use crate::window::Window;

/// Attributes fetched before a location can be displayed.
fn transition_attributes() -> Attributes {
    Attributes::INFO | Attributes::METADATA | Attributes::MOUNT
}

pub struct TransitionController<P: FileProvider, F: ViewFactory> {
    config: NavConfig,
    provider: P,
    factory: F,
    mailbox: Mailbox,
    windows: BTreeMap<WindowId, Window>,
    slots: BTreeMap<SlotId, Slot>,
    observers: Vec<Box<dyn NavObserver>>,
    next_window: u64,
    next_slot: u64,
    next_op: u64,
    next_view: u64,
}

impl<P: FileProvider, F: ViewFactory> TransitionController<P, F> {
    pub fn new(config: NavConfig, provider: P, factory: F) -> Self {
        Self {
            config,
            provider,
            factory,
            mailbox: Mailbox::new(),
            windows: BTreeMap::new(),
            slots: BTreeMap::new(),
            observers: Vec::new(),
            next_window: 0,
            next_slot: 0,
            next_op: 0,
            next_view: 0,
        }
    }

    // -- accessors -------------------------------------------------------

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Replace the preferences. Takes effect for transitions begun later.
    pub fn set_config(&mut self, config: NavConfig) {
        log::debug!("preferences changed");
        self.config = config;
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn add_observer(&mut self, observer: Box<dyn NavObserver>) {
        self.observers.push(observer);
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.values()
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot> {
        self.slots.get(&id)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    // -- windows and slots -------------------------------------------------

    /// Create a window of `kind` with one empty slot.
    pub fn open_window(&mut self, kind: WindowKind) -> (WindowId, SlotId) {
        self.next_window += 1;
        let id = WindowId(self.next_window);
        self.windows.insert(id, Window::new(id, kind));
        log::debug!("{id}: opened {kind:?} window");
        self.emit(NavEvent::WindowOpened { window: id, kind });
        let slot = self.add_slot(id);
        (id, slot)
    }

    /// Add a slot (tab) to `window`.
    pub fn open_slot(&mut self, window: WindowId) -> Result<SlotId> {
        let w = self
            .windows
            .get(&window)
            .ok_or(NavError::UnknownWindow(window))?;
        if !w.kind().supports_tabs() && !w.slots().is_empty() {
            return Err(NavError::Unsupported(format!(
                "{:?} windows hold a single slot",
                w.kind()
            )));
        }
        Ok(self.add_slot(window))
    }

    fn add_slot(&mut self, window: WindowId) -> SlotId {
        self.next_slot += 1;
        let id = SlotId(self.next_slot);
        self.slots.insert(id, Slot::new(id, window));
        let position = self.config.new_tab_position;
        let position = match self.windows.get_mut(&window) {
            Some(w) => w.insert_slot(id, position),
            None => 0,
        };
        self.emit(NavEvent::SlotOpened {
            window,
            slot: id,
            position,
        });
        id
    }

    /// Record that `window` is now visible, closing any window that asked to
    /// be closed behind it.
    pub fn mark_shown(&mut self, window: WindowId) -> Result<()> {
        let close = self
            .windows
            .get_mut(&window)
            .ok_or(NavError::UnknownWindow(window))?
            .set_shown();
        for other in close {
            if let Err(e) = self.close_window(other) {
                log::debug!("{window}: close-behind of {other} skipped: {e}");
            }
        }
        Ok(())
    }

    pub fn set_active_slot(&mut self, window: WindowId, slot: SlotId) -> Result<()> {
        let w = self
            .windows
            .get_mut(&window)
            .ok_or(NavError::UnknownWindow(window))?;
        if !w.set_active(slot) {
            return Err(NavError::UnknownSlot(slot));
        }
        self.report_location_change(window)
    }

    /// Close one slot. Closing the last slot of a window closes the window.
    pub fn close_slot(&mut self, slot: SlotId) -> Result<()> {
        let window = self.slot_ref(slot)?.window;
        self.discard_slot(slot);
        let remaining = match self.windows.get_mut(&window) {
            Some(w) => {
                w.remove_slot(slot);
                w.slots().len()
            },
            None => return Ok(()),
        };
        if remaining == 0 {
            return self.close_window(window);
        }
        self.report_location_change(window)
    }

    pub fn close_window(&mut self, window: WindowId) -> Result<()> {
        let w = self
            .windows
            .remove(&window)
            .ok_or(NavError::UnknownWindow(window))?;
        for slot in w.slots() {
            self.discard_slot(*slot);
        }
        log::debug!("{window}: closed");
        self.emit(NavEvent::WindowClosed { window });
        Ok(())
    }

    /// Cancel everything a slot has outstanding and drop it.
    fn discard_slot(&mut self, slot: SlotId) {
        self.end_location_change(slot);
        let Some(mut s) = self.slots.remove(&slot) else {
            return;
        };
        for op in [s.find_mount_op.take(), s.viewed.take().map(|v| v.op)]
            .into_iter()
            .flatten()
        {
            op.cancel();
        }
        if let Some(mut bound) = s.current_view.take() {
            bound.view.stop_loading();
        }
        self.emit(NavEvent::SlotClosed {
            window: s.window,
            slot,
        });
    }

    /// Re-announce what the active slot of `window` shows (or is about to).
    pub fn report_location_change(&mut self, window: WindowId) -> Result<()> {
        let w = self
            .windows
            .get(&window)
            .ok_or(NavError::UnknownWindow(window))?;
        let Some(slot) = w.active_slot() else {
            return Ok(());
        };
        let location = self
            .slots
            .get(&slot)
            .and_then(Slot::displayed_or_pending)
            .cloned();
        if let Some(location) = location {
            self.emit(NavEvent::LocationChanged {
                window,
                slot,
                location,
            });
        }
        Ok(())
    }

    // -- transitions -------------------------------------------------------

    /// Start moving `slot` to `request.target`. Any transition already
    /// pending on the slot is cancelled first. Returns once the metadata
    /// fetch has been issued.
    pub fn begin_transition(&mut self, slot: SlotId, mut request: LocationRequest) -> Result<()> {
        self.slot_ref(slot)?;
        if !request.change_type.uses_distance() && request.distance != 0 {
            log::warn!(
                "{slot}: distance {} ignored for {:?} change",
                request.distance,
                request.change_type
            );
            request.distance = 0;
        }

        self.end_location_change(slot);

        let target = request.target.clone();
        let force_reload = request.change_type == ChangeType::Reload
            || !self.config.monitor_active
            || !self.provider.monitors(&target);

        let s = self.slot_mut(slot)?;
        let first_visible = s.first_visible_item();
        if let Some(bookmark) = s.current_bookmark.as_mut() {
            bookmark.set_scroll_position(first_visible);
        }
        request.tried_mount = false;
        request.mount_error = None;
        s.pending_scroll_to = request.scroll_target.clone();
        log::debug!(
            "{slot}: begin {:?} transition to {target}",
            request.change_type
        );
        s.pending = Some(request);
        s.phase = Phase::ResolvingMetadata;
        if let Some(viewed) = s.viewed.take() {
            viewed.op.cancel();
        }

        self.set_allow_stop(slot, true);
        if force_reload {
            self.provider.invalidate(&target);
        }
        self.fetch_metadata(slot, &target);
        Ok(())
    }

    /// Abandon the pending transition of `slot`, if any, and put the current
    /// view back on the current location. Does nothing when idle.
    pub fn cancel(&mut self, slot: SlotId) -> Result<()> {
        self.slot_ref(slot)?;
        self.cancel_location_change(slot);
        Ok(())
    }

    fn cancel_location_change(&mut self, slot: SlotId) {
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        if s.pending.is_some() {
            if let (Some(location), Some(current)) = (s.location.clone(), s.current_view.as_mut()) {
                // The incoming view is either this one, or the change being
                // cancelled; only the current view needs telling.
                let selection = current.view.selection();
                current.view.load_location(&location);
                current.view.set_selection(&selection);
            }
        }
        self.end_location_change(slot);
        self.ensure_watch(slot);
    }

    fn end_location_change(&mut self, slot: SlotId) {
        self.free_location_change(slot);
        if let Some(s) = self.slots.get_mut(&slot) {
            s.pending_scroll_to = None;
            s.phase = Phase::Idle;
        }
        self.set_allow_stop(slot, false);
    }

    /// Drop the pending request and everything issued on its behalf.
    fn free_location_change(&mut self, slot: SlotId) {
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        s.pending = None;
        for op in [s.metadata_op.take(), s.mount_op.take()]
            .into_iter()
            .flatten()
        {
            op.cancel();
        }
        if let Some(Incoming::Fresh(mut bound)) = s.incoming.take() {
            log::debug!("{slot}: dropping incoming {}", bound.view_id());
            bound.view.stop_loading();
        }
    }

    // -- mailbox -----------------------------------------------------------

    /// Deliver every queued completion and view signal, including ones
    /// queued while delivering. Returns how many were handled.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Some(msg) = self.mailbox.try_next() {
            self.dispatch(msg);
            handled += 1;
        }
        handled
    }

    /// Route one message to its handler.
    pub fn dispatch(&mut self, msg: Message) {
        match msg {
            Message::Completion(c) => {
                let (slot, op) = (c.slot, c.op);
                match (c.kind, c.payload) {
                    (OpKind::Metadata, Payload::Info(result)) => self.on_metadata(slot, op, result),
                    (OpKind::Mount, Payload::Mounted(result)) => self.on_mounted(slot, op, result),
                    (OpKind::FindMount, Payload::EnclosingMount(mount)) => {
                        self.on_found_mount(slot, op, mount);
                    },
                    (OpKind::Watch, Payload::FileChanged(change)) => {
                        self.on_file_changed(slot, op, change);
                    },
                    (kind, payload) => {
                        log::warn!("{slot} {op}: {kind:?} completion carried {payload:?}");
                    },
                }
            },
            Message::View(signal) => self.on_view_signal(signal),
        }
    }

    // -- helpers -----------------------------------------------------------

    fn slot_ref(&self, slot: SlotId) -> Result<&Slot> {
        self.slots.get(&slot).ok_or(NavError::UnknownSlot(slot))
    }

    fn slot_mut(&mut self, slot: SlotId) -> Result<&mut Slot> {
        self.slots.get_mut(&slot).ok_or(NavError::UnknownSlot(slot))
    }

    fn window_of(&self, slot: SlotId) -> Option<&Window> {
        self.slots
            .get(&slot)
            .and_then(|s| self.windows.get(&s.window))
    }

    fn emit(&mut self, event: NavEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
    }

    fn set_allow_stop(&mut self, slot: SlotId, allow_stop: bool) {
        let Some(s) = self.slots.get_mut(&slot) else {
            return;
        };
        if s.allow_stop == allow_stop {
            return;
        }
        s.allow_stop = allow_stop;
        self.emit(NavEvent::LoadingChanged { slot, allow_stop });
    }

    fn new_op(&mut self) -> PendingOp {
        self.next_op += 1;
        PendingOp {
            id: OpId(self.next_op),
            token: CancelToken::new(),
        }
    }

    fn new_view_key(&mut self) -> ViewKey {
        self.next_view += 1;
        ViewKey(self.next_view)
    }

    fn ticket(&self, slot: SlotId, op: &PendingOp, kind: OpKind) -> Ticket {
        Ticket::new(slot, op.id, kind, op.token.clone(), self.mailbox.sender())
    }

    fn fetch_metadata(&mut self, slot: SlotId, target: &Location) {
        let op = self.new_op();
        let ticket = self.ticket(slot, &op, OpKind::Metadata);
        if let Some(s) = self.slots.get_mut(&slot) {
            if let Some(old) = s.metadata_op.replace(op) {
                old.cancel();
            }
        }
        self.provider
            .fetch_info(target, transition_attributes(), ticket);
    }
}

/// Whether a completion for `op` answers the operation still outstanding.
fn is_fresh(outstanding: Option<&PendingOp>, op: OpId) -> bool {
    outstanding.is_some_and(|p| p.id == op && !p.token.is_cancelled())
}
