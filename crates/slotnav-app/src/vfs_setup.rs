use slotnav_types::{METADATA_KEY_DEFAULT_VIEW, Result};
use slotnav_vfs::{MemoryVfs, MetadataProvider};

/// Create demo content: a home tree, a few files, a camera card that is
/// not mounted yet and a network share the provider cannot reach.
pub fn populate_demo_vfs(vfs: &mut MemoryVfs) -> Result<()> {
    vfs.mkdir("/etc")?;
    vfs.mkdir("/tmp")?;
    vfs.mkdir("/home/user/Documents/reports")?;
    vfs.mkdir("/home/user/Music/albums")?;
    vfs.mkdir("/home/user/Pictures")?;
    vfs.write("/home/user/readme.txt", "text/plain")?;
    vfs.write("/home/user/Documents/plan.odt", "application/vnd.oasis.opendocument.text")?;
    vfs.write("/etc/hostname", "text/plain")?;

    // Pictures open in the list view.
    let pictures = slotnav_types::Location::parse("/home/user/Pictures")?;
    vfs.set_metadata(&pictures, METADATA_KEY_DEFAULT_VIEW, Some("list-view"))?;

    let card = vfs.add_mount(
        "camera",
        "/media/camera",
        false,
        &["x-content/image-dcf", "x-content/blank-cd"],
    )?;
    vfs.mkdir(&format!("{}/DCIM", card.path()))?;
    vfs.add_mount("backup", "/media/backup", false, &[])?;
    vfs.set_mount_error("/media/backup", Some(slotnav_types::FileError::PermissionDenied))?;
    Ok(())
}
