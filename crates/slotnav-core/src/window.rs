//! Windows: ordered groups of slots sharing one transition policy.

use serde::Serialize;
use slotnav_types::{NewTabPosition, SlotId, WindowId};

use crate::policy::WindowKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Window {
    id: WindowId,
    kind: WindowKind,
    slots: Vec<SlotId>,
    active: Option<SlotId>,
    shown: bool,
    /// Windows to close once this one is first shown (close-behind).
    close_on_show: Vec<WindowId>,
}

impl Window {
    pub fn new(id: WindowId, kind: WindowKind) -> Self {
        Self {
            id,
            kind,
            slots: Vec::new(),
            active: None,
            shown: false,
            close_on_show: Vec::new(),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn slots(&self) -> &[SlotId] {
        &self.slots
    }

    pub fn active_slot(&self) -> Option<SlotId> {
        self.active
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub(crate) fn set_shown(&mut self) -> Vec<WindowId> {
        self.shown = true;
        std::mem::take(&mut self.close_on_show)
    }

    pub(crate) fn close_when_shown(&mut self, other: WindowId) {
        if !self.close_on_show.contains(&other) {
            self.close_on_show.push(other);
        }
    }

    pub(crate) fn set_active(&mut self, slot: SlotId) -> bool {
        if self.slots.contains(&slot) {
            self.active = Some(slot);
            true
        } else {
            false
        }
    }

    /// Insert `slot` and return its position. The first slot becomes active.
    pub(crate) fn insert_slot(&mut self, slot: SlotId, position: NewTabPosition) -> usize {
        let index = match (position, self.active) {
            (NewTabPosition::AfterCurrent, Some(active)) => self
                .slots
                .iter()
                .position(|s| *s == active)
                .map_or(self.slots.len(), |i| i + 1),
            _ => self.slots.len(),
        };
        self.slots.insert(index, slot);
        if self.active.is_none() {
            self.active = Some(slot);
        }
        index
    }

    /// Remove `slot`. If it was active, its right neighbour (or else the new
    /// last slot) becomes active.
    pub(crate) fn remove_slot(&mut self, slot: SlotId) -> bool {
        let Some(index) = self.slots.iter().position(|s| *s == slot) else {
            return false;
        };
        self.slots.remove(index);
        if self.active == Some(slot) {
            self.active = self
                .slots
                .get(index)
                .or_else(|| self.slots.last())
                .copied();
        }
        true
    }
}
