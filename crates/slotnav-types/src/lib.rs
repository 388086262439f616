//! Foundation types shared by all slotnav crates.
//!
//! This crate holds the vocabulary of the navigation subsystem: slot and
//! window identifiers, [`Location`] values, file metadata and the provider
//! error taxonomy, the [`NavConfig`] preferences, the crate-wide error
//! type, and the ticket/mailbox plumbing that carries asynchronous
//! completions back to the controller.

pub mod config;
pub mod error;
pub mod file;
pub mod ids;
pub mod location;
pub mod op;

pub use config::{NavConfig, NewTabPosition};
pub use error::{NavError, Result};
pub use file::{
    FileChange, FileError, FileInfo, FileInfoResult, FileType, METADATA_KEY_DEFAULT_VIEW,
    METADATA_KEY_SCROLL_POSITION, MountInfo,
};
pub use ids::{OpId, SlotId, ViewKey, WindowId};
pub use location::Location;
pub use op::{
    Attributes, CancelToken, Completion, Mailbox, Message, OpKind, Payload, Ticket, ViewEvent,
    ViewSignal,
};
