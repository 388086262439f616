//! Provider seam between the transition controller and whatever actually
//! knows about files and volumes.
//!
//! Operations that may block in a real backend take a [`Ticket`] and answer
//! later through it; cheap queries and cache control are synchronous.

pub mod memory;

pub use memory::MemoryVfs;

use slotnav_types::{Attributes, Location, Result, Ticket};

/// File metadata queries and per-location key/value storage.
pub trait MetadataProvider {
    /// Fetch info for `location`. Answers with [`slotnav_types::Payload::Info`].
    fn fetch_info(&mut self, location: &Location, attributes: Attributes, ticket: Ticket);

    /// Drop anything cached about `location` so the next fetch rereads it.
    fn invalidate(&mut self, location: &Location);

    /// Store (`Some`) or clear (`None`) a per-location metadata value.
    fn set_metadata(&mut self, location: &Location, key: &str, value: Option<&str>) -> Result<()>;

    /// Whether `location` currently exists.
    fn exists(&self, location: &Location) -> bool;

    /// Subscribe to changes of the entity backing `location`. Answers with
    /// [`slotnav_types::Payload::FileChanged`] until the ticket is cancelled.
    fn watch(&mut self, location: &Location, ticket: Ticket);

    /// Whether changes inside `location` are reported without a reload.
    fn monitors(&self, location: &Location) -> bool {
        location.is_local()
    }
}

/// Volume mounting.
pub trait MountProvider {
    /// Mount the volume enclosing `location`. Answers with
    /// [`slotnav_types::Payload::Mounted`].
    fn mount_enclosing_volume(&mut self, location: &Location, ticket: Ticket);

    /// Look up the mounted volume enclosing `location`. Answers with
    /// [`slotnav_types::Payload::EnclosingMount`].
    fn find_enclosing_mount(&mut self, location: &Location, ticket: Ticket);
}

/// Everything the controller needs from its backend.
pub trait FileProvider: MetadataProvider + MountProvider {}

impl<T: MetadataProvider + MountProvider> FileProvider for T {}
