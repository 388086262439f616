//! User-facing failure messages.

use slotnav_types::{FileError, FileInfo, Location};

const ELLIPSIS: &str = "...";

/// Shorten `text` to at most `max` characters by replacing its middle with
/// `...`. Text that already fits is returned unchanged.
pub fn middle_truncate(text: &str, max: usize) -> String {
    let len = text.chars().count();
    if len <= max || max < ELLIPSIS.len() {
        return text.to_string();
    }
    let keep = max - ELLIPSIS.len();
    let left = keep / 2;
    let right = keep - left;
    let mut out: String = text.chars().take(left).collect();
    out.push_str(ELLIPSIS);
    out.extend(text.chars().skip(len - right));
    out
}

/// Headline and detail for a location no view could be chosen for, or
/// `None` when the failure must not be reported (cancellation).
pub fn view_selection_message(
    location: &Location,
    info: &FileInfo,
    error: Option<&FileError>,
    max_uri: usize,
) -> Option<(String, String)> {
    let uri = middle_truncate(&location.parse_name(), max_uri);
    let could_not_display = format!("Could not display \"{uri}\".");
    let pair = match error {
        None if info.is_directory() => (
            could_not_display,
            "No installed viewer is capable of displaying the folder.".to_string(),
        ),
        None => (could_not_display, "The location is not a folder.".to_string()),
        Some(FileError::NotFound) => (
            format!("Could not find \"{uri}\"."),
            "Please check the spelling and try again.".to_string(),
        ),
        Some(FileError::NotSupported) => (
            could_not_display,
            format!("Cannot handle \"{}\" locations.", location.scheme()),
        ),
        Some(FileError::NotMounted) => {
            (could_not_display, "Unable to mount the location.".to_string())
        },
        Some(FileError::PermissionDenied) => {
            (could_not_display, "Access was denied.".to_string())
        },
        Some(FileError::HostNotFound) => (
            format!("Could not display \"{uri}\", because the host could not be found."),
            "Check that the spelling is correct and that your proxy settings are correct."
                .to_string(),
        ),
        Some(FileError::Cancelled) => return None,
        Some(FileError::Other(message)) => (
            could_not_display,
            format!("Error: {message}\nPlease select another viewer and try again."),
        ),
    };
    Some(pair)
}

/// Detail shown when the view displaying the current location fails.
pub const CURRENT_VIEW_DETAIL: &str =
    "You can choose another view or go to a different location.";

/// Detail shown when a view fails while starting to display a new location.
pub const NASCENT_VIEW_DETAIL: &str = "The location cannot be displayed with this viewer.";
