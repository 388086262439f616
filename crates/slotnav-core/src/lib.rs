//! Location-transition controller.
//!
//! This crate moves navigable slots (tabs or windows) from one location to
//! another: it fetches metadata through a [`slotnav_vfs::FileProvider`],
//! mounts enclosing volumes once when needed, picks a view, swaps views in
//! when they start loading, and keeps back/forward history. The
//! [`TransitionController`] is the entry point; hosts drive it by calling
//! its operations and draining its mailbox with
//! [`TransitionController::poll`].

pub mod bookmark;
pub mod controller;
pub mod events;
pub mod failure;
pub mod history;
pub mod policy;
pub mod request;
pub mod resolver;
pub mod slot;
pub mod view;
pub mod window;

#[cfg(test)]
pub(crate) mod test_utils;

// -----------------------------------------------------------------------
// Public re-exports
// -----------------------------------------------------------------------

pub use bookmark::Bookmark;
pub use controller::TransitionController;
pub use events::{DisplayFailure, EventLog, FailureKind, NavEvent, NavObserver};
pub use history::{Direction, History};
pub use policy::WindowKind;
pub use request::{ChangeType, LocationRequest, OpenFlags, OpenMode};
pub use slot::{Phase, Slot, SlotSnapshot};
pub use view::{ContentView, ViewFactory, ViewHandle};
pub use window::Window;
