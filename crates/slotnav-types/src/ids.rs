//! Opaque identifiers for slots, windows, view instances and async operations.

use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

id_type!(
    /// One navigable display unit (a tab or a window's only pane).
    SlotId,
    "slot"
);
id_type!(
    /// A top-level window owning one or more slots.
    WindowId,
    "window"
);
id_type!(
    /// A concrete view instance bound to a slot.
    ViewKey,
    "view"
);
id_type!(
    /// One outstanding asynchronous operation.
    OpId,
    "op"
);
