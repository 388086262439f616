//! Picks the view id a location is displayed with.

use slotnav_types::{FileInfo, Location, METADATA_KEY_DEFAULT_VIEW};

use crate::request::ChangeType;
use crate::view::ViewFactory;

/// Choose a view for `location`.
///
/// Candidates in order: the per-location preference stored in metadata
/// (skipped for `Fallback`, since that preference is what just failed), then
/// `default_view`. The first candidate the factory supports wins.
pub fn resolve<F: ViewFactory + ?Sized>(
    location: &Location,
    info: &FileInfo,
    change: ChangeType,
    default_view: &str,
    factory: &F,
) -> Option<String> {
    let preferred = match change {
        ChangeType::Fallback => None,
        _ => info
            .metadata(METADATA_KEY_DEFAULT_VIEW)
            .filter(|id| !id.is_empty()),
    };
    preferred
        .into_iter()
        .chain(std::iter::once(default_view))
        .find(|id| factory.view_supports(id, location, info.file_type, &info.mime_type))
        .map(str::to_string)
}
