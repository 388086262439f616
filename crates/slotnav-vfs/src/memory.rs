//! In-memory provider implementation.
//!
//! Useful for unit tests and the demo binary. The whole tree lives in a
//! `BTreeMap<Location, Node>`. Asynchronous requests are queued and only
//! answered when the host calls [`MemoryVfs::run_pending`] (or
//! [`MemoryVfs::run_one`]), so tests decide exactly when each completion
//! lands relative to other events. Requests are answered against the tree
//! as it is at completion time.

use std::collections::{BTreeMap, VecDeque};

use slotnav_types::{
    Attributes, FileChange, FileError, FileInfo, FileInfoResult, FileType, Location, MountInfo,
    NavError, Payload, Result, Ticket,
};

use crate::{MetadataProvider, MountProvider};

const DIRECTORY_MIME: &str = "inode/directory";

#[derive(Debug, Clone)]
struct Node {
    kind: FileType,
    mime: String,
    metadata: BTreeMap<String, String>,
}

impl Node {
    fn dir() -> Self {
        Self {
            kind: FileType::Directory,
            mime: DIRECTORY_MIME.to_string(),
            metadata: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct MountPoint {
    name: String,
    root: Location,
    mounted: bool,
    /// Error returned by the next mount attempt, if any.
    mount_error: Option<FileError>,
    content_types: Vec<String>,
}

#[derive(Debug)]
enum Request {
    Info(Location),
    Mount(Location),
    FindMount(Location),
}

/// A fully in-memory file and volume provider.
#[derive(Debug)]
pub struct MemoryVfs {
    nodes: BTreeMap<Location, Node>,
    mounts: Vec<MountPoint>,
    /// Injected errors returned by metadata fetches.
    failures: BTreeMap<Location, FileError>,
    schemes: Vec<String>,
    /// Locations whose changes are not reported (forces reloads).
    unmonitored: Vec<Location>,
    pending: VecDeque<(Request, Ticket)>,
    watchers: Vec<(Location, Ticket)>,
    invalidations: Vec<Location>,
}

impl MemoryVfs {
    /// Create a provider with an empty root directory and an empty trash.
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(Location::root(), Node::dir());
        if let Ok(trash) = Location::parse("trash:///") {
            nodes.insert(trash, Node::dir());
        }
        Self {
            nodes,
            mounts: Vec::new(),
            failures: BTreeMap::new(),
            schemes: vec!["file".to_string(), "trash".to_string()],
            unmonitored: Vec::new(),
            pending: VecDeque::new(),
            watchers: Vec::new(),
            invalidations: Vec::new(),
        }
    }

    // -- tree construction ---------------------------------------------

    /// Create a directory and any missing parents.
    pub fn mkdir(&mut self, path: &str) -> Result<Location> {
        let location = Location::parse(path)?;
        self.mkdir_at(&location)?;
        Ok(location)
    }

    fn mkdir_at(&mut self, location: &Location) -> Result<()> {
        match self.nodes.get(location) {
            Some(node) if node.kind == FileType::Directory => return Ok(()),
            Some(_) => {
                return Err(NavError::Provider(format!("not a directory: {location}")));
            },
            None => {},
        }
        if let Some(parent) = location.parent() {
            self.mkdir_at(&parent)?;
        }
        self.nodes.insert(location.clone(), Node::dir());
        Ok(())
    }

    /// Create (or replace) a regular file. The parent must exist.
    pub fn write(&mut self, path: &str, mime: &str) -> Result<Location> {
        let location = Location::parse(path)?;
        let parent_ok = location
            .parent()
            .is_some_and(|p| self.nodes.get(&p).is_some_and(|n| n.kind == FileType::Directory));
        if !parent_ok {
            return Err(NavError::Provider(format!(
                "parent directory does not exist: {location}"
            )));
        }
        if self.nodes.get(&location).is_some_and(|n| n.kind == FileType::Directory) {
            return Err(NavError::Provider(format!("is a directory: {location}")));
        }
        self.nodes.insert(
            location.clone(),
            Node {
                kind: FileType::Regular,
                mime: mime.to_string(),
                metadata: BTreeMap::new(),
            },
        );
        self.notify(&location, |_| FileChange::Changed);
        Ok(location)
    }

    /// Register a volume rooted at `path`. Its root directory is created.
    /// While unmounted, fetches inside it fail with `NotMounted`.
    pub fn add_mount(
        &mut self,
        name: &str,
        path: &str,
        mounted: bool,
        content_types: &[&str],
    ) -> Result<Location> {
        let root = self.mkdir(path)?;
        self.mounts.retain(|m| m.root != root);
        self.mounts.push(MountPoint {
            name: name.to_string(),
            root: root.clone(),
            mounted,
            mount_error: None,
            content_types: content_types.iter().map(|s| s.to_string()).collect(),
        });
        Ok(root)
    }

    /// Make the next mount attempts of the volume at `path` fail.
    pub fn set_mount_error(&mut self, path: &str, error: Option<FileError>) -> Result<()> {
        let root = Location::parse(path)?;
        let mount = self
            .mounts
            .iter_mut()
            .find(|m| m.root == root)
            .ok_or_else(|| NavError::Provider(format!("no mount at {root}")))?;
        mount.mount_error = error;
        Ok(())
    }

    /// Make metadata fetches of `path` fail with `error`.
    pub fn fail_with(&mut self, path: &str, error: FileError) -> Result<()> {
        self.failures.insert(Location::parse(path)?, error);
        Ok(())
    }

    pub fn clear_failure(&mut self, path: &str) -> Result<()> {
        self.failures.remove(&Location::parse(path)?);
        Ok(())
    }

    /// Accept locations with this scheme instead of answering `NotSupported`.
    pub fn support_scheme(&mut self, scheme: &str) {
        if !self.schemes.iter().any(|s| s == scheme) {
            self.schemes.push(scheme.to_string());
        }
    }

    /// Stop reporting changes below `path`.
    pub fn set_unmonitored(&mut self, path: &str) -> Result<()> {
        self.unmonitored.push(Location::parse(path)?);
        Ok(())
    }

    // -- mutations observed by watchers --------------------------------

    /// Delete `path` and everything below it.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        let location = self.existing(path)?;
        if location.is_root() {
            return Err(NavError::Provider("cannot remove root".to_string()));
        }
        self.nodes.retain(|k, _| !location.contains(k));
        self.notify(&location, |_| FileChange::Gone);
        Ok(())
    }

    /// Move `path` (and its subtree) into the trash.
    pub fn trash(&mut self, path: &str) -> Result<Location> {
        let location = self.existing(path)?;
        let target = Location::parse(&format!("trash:///{}", location.basename()))?;
        self.move_subtree(&location, &target);
        self.notify(&location, |_| FileChange::MovedToTrash);
        Ok(target)
    }

    /// Rename or move `from` (and its subtree) to `to`.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<Location> {
        let source = self.existing(from)?;
        let target = Location::parse(to)?;
        if self.nodes.contains_key(&target) {
            return Err(NavError::Provider(format!("already exists: {target}")));
        }
        self.move_subtree(&source, &target);
        self.notify(&source, |watched| {
            FileChange::Renamed(rebase(watched, &source, &target))
        });
        for (watched, _) in &mut self.watchers {
            if source.contains(watched) {
                *watched = rebase(watched, &source, &target);
            }
        }
        Ok(target)
    }

    fn existing(&self, path: &str) -> Result<Location> {
        let location = Location::parse(path)?;
        if !self.nodes.contains_key(&location) {
            return Err(NavError::Provider(format!("no such path: {location}")));
        }
        Ok(location)
    }

    fn move_subtree(&mut self, from: &Location, to: &Location) {
        let moved: Vec<Location> = self.nodes.keys().filter(|k| from.contains(k)).cloned().collect();
        for old in moved {
            if let Some(node) = self.nodes.remove(&old) {
                self.nodes.insert(rebase(&old, from, to), node);
            }
        }
    }

    /// Notify every live watcher at or below `changed`.
    fn notify(&mut self, changed: &Location, change: impl Fn(&Location) -> FileChange) {
        self.watchers.retain(|(_, ticket)| !ticket.is_cancelled());
        for (watched, ticket) in &self.watchers {
            if changed.contains(watched) {
                log::debug!("memory vfs: {watched} changed");
                ticket.notify(Payload::FileChanged(change(watched)));
            }
        }
    }

    // -- queue control --------------------------------------------------

    /// Number of requests waiting for an answer.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Registered watchers, counting cancelled ones not yet pruned.
    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// Answer the oldest queued request. Returns `false` if none was queued.
    pub fn run_one(&mut self) -> bool {
        let Some((request, ticket)) = self.pending.pop_front() else {
            return false;
        };
        let payload = match request {
            Request::Info(location) => Payload::Info(self.info_result(&location, &ticket)),
            Request::Mount(location) => Payload::Mounted(self.mount(&location, &ticket)),
            Request::FindMount(location) => {
                Payload::EnclosingMount(self.enclosing_mount(&location, &ticket))
            },
        };
        ticket.complete(payload);
        true
    }

    /// Answer every queued request, including ones queued while answering.
    /// Returns how many were answered.
    pub fn run_pending(&mut self) -> usize {
        let mut count = 0;
        while self.run_one() {
            count += 1;
        }
        count
    }

    /// Locations invalidated so far, oldest first.
    pub fn invalidations(&self) -> &[Location] {
        &self.invalidations
    }

    pub fn is_mounted(&self, path: &str) -> bool {
        Location::parse(path)
            .ok()
            .and_then(|root| self.mounts.iter().find(|m| m.root == root))
            .is_some_and(|m| m.mounted)
    }

    /// Stored metadata value for `location`.
    pub fn metadata(&self, location: &Location, key: &str) -> Option<&str> {
        self.nodes.get(location)?.metadata.get(key).map(String::as_str)
    }

    // -- request handling -----------------------------------------------

    fn mount_for(&self, location: &Location) -> Option<&MountPoint> {
        // Innermost mount wins.
        self.mounts
            .iter()
            .filter(|m| m.root.contains(location))
            .max_by_key(|m| m.root.path().len())
    }

    fn info_result(&self, location: &Location, ticket: &Ticket) -> FileInfoResult {
        if ticket.is_cancelled() {
            return FileInfoResult::failed(location, FileError::Cancelled);
        }
        if !self.schemes.iter().any(|s| s == location.scheme()) {
            return FileInfoResult::failed(location, FileError::NotSupported);
        }
        if self.mount_for(location).is_some_and(|m| !m.mounted) {
            return FileInfoResult::failed(location, FileError::NotMounted);
        }
        let info = match self.nodes.get(location) {
            Some(node) => FileInfo {
                location: location.clone(),
                file_type: node.kind,
                mime_type: node.mime.clone(),
                display_name: location.basename().to_string(),
                metadata: node.metadata.clone(),
            },
            None => return FileInfoResult::failed(location, FileError::NotFound),
        };
        FileInfoResult {
            info,
            error: self.failures.get(location).cloned(),
        }
    }

    fn mount(&mut self, location: &Location, ticket: &Ticket) -> std::result::Result<(), FileError> {
        if ticket.is_cancelled() {
            return Err(FileError::Cancelled);
        }
        let root = self
            .mount_for(location)
            .map(|m| m.root.clone())
            .ok_or(FileError::NotSupported)?;
        let mount = self
            .mounts
            .iter_mut()
            .find(|m| m.root == root)
            .ok_or(FileError::NotSupported)?;
        if let Some(err) = mount.mount_error.clone() {
            log::debug!("memory vfs: mounting {} failed: {err}", mount.name);
            return Err(err);
        }
        mount.mounted = true;
        log::debug!("memory vfs: mounted {} at {}", mount.name, mount.root);
        Ok(())
    }

    fn enclosing_mount(&self, location: &Location, ticket: &Ticket) -> Option<MountInfo> {
        if ticket.is_cancelled() {
            return None;
        }
        self.mount_for(location)
            .filter(|m| m.mounted)
            .map(|m| MountInfo {
                name: m.name.clone(),
                root: m.root.clone(),
                content_types: m.content_types.clone(),
            })
    }
}

impl Default for MemoryVfs {
    fn default() -> Self {
        Self::new()
    }
}

/// Map `location` from below `from` to the same relative place below `to`.
fn rebase(location: &Location, from: &Location, to: &Location) -> Location {
    let rest = location.path()[from.path().len()..].trim_start_matches('/');
    if rest.is_empty() {
        to.clone()
    } else {
        to.join(rest)
    }
}

impl MetadataProvider for MemoryVfs {
    fn fetch_info(&mut self, location: &Location, _attributes: Attributes, ticket: Ticket) {
        self.pending.push_back((Request::Info(location.clone()), ticket));
    }

    fn invalidate(&mut self, location: &Location) {
        self.invalidations.push(location.clone());
    }

    fn set_metadata(&mut self, location: &Location, key: &str, value: Option<&str>) -> Result<()> {
        let node = self
            .nodes
            .get_mut(location)
            .ok_or_else(|| NavError::Provider(format!("no such path: {location}")))?;
        match value {
            Some(v) => node.metadata.insert(key.to_string(), v.to_string()),
            None => node.metadata.remove(key),
        };
        Ok(())
    }

    fn exists(&self, location: &Location) -> bool {
        self.nodes.contains_key(location)
    }

    fn watch(&mut self, location: &Location, ticket: Ticket) {
        self.watchers.retain(|(_, ticket)| !ticket.is_cancelled());
        self.watchers.push((location.clone(), ticket));
    }

    fn monitors(&self, location: &Location) -> bool {
        location.is_local() && !self.unmonitored.iter().any(|u| u.contains(location))
    }
}

impl MountProvider for MemoryVfs {
    fn mount_enclosing_volume(&mut self, location: &Location, ticket: Ticket) {
        self.pending.push_back((Request::Mount(location.clone()), ticket));
    }

    fn find_enclosing_mount(&mut self, location: &Location, ticket: Ticket) {
        self.pending.push_back((Request::FindMount(location.clone()), ticket));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotnav_types::{CancelToken, Mailbox, Message, OpId, OpKind, SlotId};

    fn loc(s: &str) -> Location {
        Location::parse(s).unwrap()
    }

    fn ticket(mailbox: &Mailbox, kind: OpKind) -> Ticket {
        Ticket::new(SlotId(1), OpId(1), kind, CancelToken::new(), mailbox.sender())
    }

    fn next_payload(mailbox: &Mailbox) -> Payload {
        match mailbox.try_next() {
            Some(Message::Completion(c)) => c.payload,
            other => panic!("expected completion, got {other:?}"),
        }
    }

    fn fetch(vfs: &mut MemoryVfs, mailbox: &Mailbox, path: &str) -> FileInfoResult {
        vfs.fetch_info(&loc(path), Attributes::INFO, ticket(mailbox, OpKind::Metadata));
        vfs.run_pending();
        match next_payload(mailbox) {
            Payload::Info(result) => result,
            other => panic!("expected info, got {other:?}"),
        }
    }

    #[test]
    fn root_and_trash_exist() {
        let vfs = MemoryVfs::new();
        assert!(vfs.exists(&Location::root()));
        assert!(vfs.exists(&loc("trash:///")));
    }

    #[test]
    fn mkdir_creates_parents() {
        let mut vfs = MemoryVfs::new();
        vfs.mkdir("/a/b/c").unwrap();
        assert!(vfs.exists(&loc("/a")));
        assert!(vfs.exists(&loc("/a/b")));
        vfs.mkdir("/a/b").unwrap();
    }

    #[test]
    fn write_without_parent_fails() {
        let mut vfs = MemoryVfs::new();
        assert!(vfs.write("/no/such/file", "text/plain").is_err());
        vfs.mkdir("/dir").unwrap();
        assert!(vfs.write("/dir", "text/plain").is_err());
    }

    #[test]
    fn fetch_is_deferred_until_run() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        vfs.mkdir("/home").unwrap();
        vfs.fetch_info(&loc("/home"), Attributes::INFO, ticket(&mailbox, OpKind::Metadata));
        assert_eq!(vfs.pending_count(), 1);
        assert!(mailbox.try_next().is_none());
        assert_eq!(vfs.run_pending(), 1);
        match next_payload(&mailbox) {
            Payload::Info(result) => {
                assert!(result.error.is_none());
                assert!(result.info.is_directory());
                assert_eq!(result.info.mime_type, "inode/directory");
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn fetch_missing_is_not_found() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        let result = fetch(&mut vfs, &mailbox, "/ghost");
        assert_eq!(result.error, Some(FileError::NotFound));
    }

    #[test]
    fn fetch_unknown_scheme_is_not_supported() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        let result = fetch(&mut vfs, &mailbox, "gopher://host/x");
        assert_eq!(result.error, Some(FileError::NotSupported));
        vfs.support_scheme("gopher");
        let result = fetch(&mut vfs, &mailbox, "gopher://host/x");
        assert_eq!(result.error, Some(FileError::NotFound));
    }

    #[test]
    fn injected_failure_keeps_info() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        vfs.mkdir("/secret").unwrap();
        vfs.fail_with("/secret", FileError::PermissionDenied).unwrap();
        let result = fetch(&mut vfs, &mailbox, "/secret");
        assert_eq!(result.error, Some(FileError::PermissionDenied));
        assert!(result.info.is_directory());
        vfs.clear_failure("/secret").unwrap();
        assert!(fetch(&mut vfs, &mailbox, "/secret").error.is_none());
    }

    #[test]
    fn cancelled_ticket_answers_cancelled() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        let t = ticket(&mailbox, OpKind::Metadata);
        t.token.cancel();
        vfs.fetch_info(&Location::root(), Attributes::INFO, t);
        vfs.run_pending();
        match next_payload(&mailbox) {
            Payload::Info(result) => assert_eq!(result.error, Some(FileError::Cancelled)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unmounted_volume_then_mount() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        vfs.add_mount("USB", "/mnt/usb", false, &["x-content/image-dcf"]).unwrap();
        vfs.mkdir("/mnt/usb/photos").unwrap();
        let result = fetch(&mut vfs, &mailbox, "/mnt/usb/photos");
        assert_eq!(result.error, Some(FileError::NotMounted));

        vfs.mount_enclosing_volume(&loc("/mnt/usb/photos"), ticket(&mailbox, OpKind::Mount));
        vfs.run_pending();
        assert_eq!(next_payload(&mailbox), Payload::Mounted(Ok(())));
        assert!(vfs.is_mounted("/mnt/usb"));
        assert!(fetch(&mut vfs, &mailbox, "/mnt/usb/photos").error.is_none());
    }

    #[test]
    fn mount_error_is_reported() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        vfs.add_mount("NAS", "/mnt/nas", false, &[]).unwrap();
        vfs.set_mount_error("/mnt/nas", Some(FileError::Other("bad password".into())))
            .unwrap();
        vfs.mount_enclosing_volume(&loc("/mnt/nas"), ticket(&mailbox, OpKind::Mount));
        vfs.run_pending();
        assert_eq!(
            next_payload(&mailbox),
            Payload::Mounted(Err(FileError::Other("bad password".into())))
        );
        assert!(!vfs.is_mounted("/mnt/nas"));
    }

    #[test]
    fn mount_outside_volume_not_supported() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        vfs.mount_enclosing_volume(&Location::root(), ticket(&mailbox, OpKind::Mount));
        vfs.run_pending();
        assert_eq!(next_payload(&mailbox), Payload::Mounted(Err(FileError::NotSupported)));
    }

    #[test]
    fn find_enclosing_mount_only_when_mounted() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        vfs.add_mount("USB", "/mnt/usb", true, &["x-content/audio-player"]).unwrap();
        vfs.add_mount("Off", "/mnt/off", false, &[]).unwrap();
        vfs.find_enclosing_mount(&loc("/mnt/usb"), ticket(&mailbox, OpKind::FindMount));
        vfs.find_enclosing_mount(&loc("/mnt/off"), ticket(&mailbox, OpKind::FindMount));
        vfs.find_enclosing_mount(&loc("/home"), ticket(&mailbox, OpKind::FindMount));
        assert_eq!(vfs.run_pending(), 3);
        match next_payload(&mailbox) {
            Payload::EnclosingMount(Some(info)) => {
                assert_eq!(info.name, "USB");
                assert_eq!(info.content_types, vec!["x-content/audio-player".to_string()]);
            },
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(next_payload(&mailbox), Payload::EnclosingMount(None));
        assert_eq!(next_payload(&mailbox), Payload::EnclosingMount(None));
    }

    #[test]
    fn metadata_roundtrip_and_clear() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        let docs = vfs.mkdir("/docs").unwrap();
        vfs.set_metadata(&docs, "default-view", Some("list-view")).unwrap();
        assert_eq!(vfs.metadata(&docs, "default-view"), Some("list-view"));
        let result = fetch(&mut vfs, &mailbox, "/docs");
        assert_eq!(result.info.metadata("default-view"), Some("list-view"));
        vfs.set_metadata(&docs, "default-view", None).unwrap();
        assert_eq!(vfs.metadata(&docs, "default-view"), None);
        assert!(vfs.set_metadata(&loc("/ghost"), "k", Some("v")).is_err());
    }

    #[test]
    fn invalidations_are_recorded() {
        let mut vfs = MemoryVfs::new();
        vfs.invalidate(&loc("/a"));
        vfs.invalidate(&loc("/b"));
        assert_eq!(vfs.invalidations(), &[loc("/a"), loc("/b")]);
    }

    #[test]
    fn remove_notifies_watchers_below() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        vfs.mkdir("/a/b").unwrap();
        vfs.mkdir("/other").unwrap();
        vfs.watch(&loc("/a/b"), ticket(&mailbox, OpKind::Watch));
        vfs.watch(&loc("/other"), ticket(&mailbox, OpKind::Watch));
        vfs.remove("/a").unwrap();
        assert!(!vfs.exists(&loc("/a/b")));
        assert_eq!(next_payload(&mailbox), Payload::FileChanged(FileChange::Gone));
        assert!(mailbox.try_next().is_none());
    }

    #[test]
    fn cancelled_watch_is_silent() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        vfs.mkdir("/a").unwrap();
        let t = ticket(&mailbox, OpKind::Watch);
        let token = t.token.clone();
        vfs.watch(&loc("/a"), t);
        token.cancel();
        vfs.remove("/a").unwrap();
        assert!(mailbox.try_next().is_none());
    }

    #[test]
    fn new_watch_drops_cancelled_watchers() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        vfs.mkdir("/a").unwrap();
        for _ in 0..5 {
            let t = ticket(&mailbox, OpKind::Watch);
            let token = t.token.clone();
            vfs.watch(&loc("/a"), t);
            token.cancel();
        }
        vfs.watch(&loc("/a"), ticket(&mailbox, OpKind::Watch));
        assert_eq!(vfs.watcher_count(), 1);
    }

    #[test]
    fn trash_moves_subtree() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        vfs.mkdir("/home/user/old").unwrap();
        vfs.write("/home/user/old/notes.txt", "text/plain").unwrap();
        vfs.watch(&loc("/home/user/old"), ticket(&mailbox, OpKind::Watch));
        let target = vfs.trash("/home/user/old").unwrap();
        assert_eq!(target, loc("trash:///old"));
        assert!(vfs.exists(&loc("trash:///old/notes.txt")));
        assert!(!vfs.exists(&loc("/home/user/old")));
        assert_eq!(next_payload(&mailbox), Payload::FileChanged(FileChange::MovedToTrash));
    }

    #[test]
    fn rename_reports_new_location() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        vfs.mkdir("/a/inner").unwrap();
        vfs.watch(&loc("/a/inner"), ticket(&mailbox, OpKind::Watch));
        vfs.rename("/a", "/b").unwrap();
        assert!(vfs.exists(&loc("/b/inner")));
        assert_eq!(
            next_payload(&mailbox),
            Payload::FileChanged(FileChange::Renamed(loc("/b/inner")))
        );
        // The watch follows the entity to its new name.
        vfs.remove("/b/inner").unwrap();
        assert_eq!(next_payload(&mailbox), Payload::FileChanged(FileChange::Gone));
    }

    #[test]
    fn rename_onto_existing_fails() {
        let mut vfs = MemoryVfs::new();
        vfs.mkdir("/a").unwrap();
        vfs.mkdir("/b").unwrap();
        assert!(vfs.rename("/a", "/b").is_err());
    }

    #[test]
    fn remove_root_fails() {
        let mut vfs = MemoryVfs::new();
        assert!(vfs.remove("/").is_err());
        assert!(vfs.remove("/ghost").is_err());
    }

    #[test]
    fn unmonitored_locations() {
        let mut vfs = MemoryVfs::new();
        vfs.set_unmonitored("/net").unwrap();
        assert!(vfs.monitors(&loc("/home")));
        assert!(!vfs.monitors(&loc("/net/share")));
        assert!(!vfs.monitors(&loc("sftp://host/")));
    }

    #[test]
    fn requests_answer_in_fifo_order() {
        let mut vfs = MemoryVfs::new();
        let mailbox = Mailbox::new();
        for n in 0..3 {
            let t = Ticket::new(SlotId(1), OpId(n), OpKind::Metadata, CancelToken::new(), mailbox.sender());
            vfs.fetch_info(&Location::root(), Attributes::INFO, t);
        }
        vfs.run_pending();
        for n in 0..3 {
            match mailbox.try_next() {
                Some(Message::Completion(c)) => assert_eq!(c.op, OpId(n)),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mkdir_then_exists(segments in proptest::collection::vec("[a-z]{1,6}", 1..5)) {
                let mut vfs = MemoryVfs::new();
                let path = format!("/{}", segments.join("/"));
                let location = vfs.mkdir(&path).unwrap();
                prop_assert!(vfs.exists(&location));
                let mut ancestor = location.parent();
                while let Some(p) = ancestor {
                    prop_assert!(vfs.exists(&p), "missing parent: {}", p);
                    ancestor = p.parent();
                }
            }

            #[test]
            fn rename_preserves_subtree_size(
                segments in proptest::collection::vec("[a-z]{1,6}", 1..4),
                target in "[A-Z]{1,6}",
            ) {
                let mut vfs = MemoryVfs::new();
                let path = format!("/src/{}", segments.join("/"));
                vfs.mkdir(&path).unwrap();
                let before = vfs.nodes.len();
                vfs.rename("/src", &format!("/{target}")).unwrap();
                prop_assert_eq!(before, vfs.nodes.len());
                prop_assert!(!vfs.exists(&loc("/src")));
            }
        }
    }
}
