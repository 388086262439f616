//! Asynchronous operation plumbing.
//!
//! Every provider operation is issued with a [`Ticket`]: the slot and op id
//! it belongs to, a shared [`CancelToken`], and a sender into the
//! controller's [`Mailbox`]. Providers answer by calling
//! [`Ticket::complete`]; views report through their own handle which posts
//! [`ViewSignal`]s into the same mailbox. Nothing is delivered re-entrantly:
//! the host drains the mailbox from its event loop.

use std::ops::BitOr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::file::{FileChange, FileError, FileInfoResult, MountInfo};
use crate::ids::{OpId, SlotId, ViewKey};

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Shared cancellation flag. Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Whether two tokens share the same flag.
    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Which kind of provider operation a ticket belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Metadata,
    Mount,
    FindMount,
    Watch,
}

/// Set of metadata attributes requested from a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attributes(u8);

impl Attributes {
    pub const NONE: Attributes = Attributes(0);
    /// Type, mime type, display name.
    pub const INFO: Attributes = Attributes(1);
    /// Per-location key/value metadata.
    pub const METADATA: Attributes = Attributes(1 << 1);
    /// Mount state of the enclosing volume.
    pub const MOUNT: Attributes = Attributes(1 << 2);

    pub fn contains(self, other: Attributes) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Attributes {
    type Output = Attributes;

    fn bitor(self, rhs: Attributes) -> Attributes {
        Attributes(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// Result data of a provider operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Info(FileInfoResult),
    Mounted(std::result::Result<(), FileError>),
    EnclosingMount(Option<MountInfo>),
    FileChanged(FileChange),
}

/// A provider reply, tagged with the operation it answers.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub slot: SlotId,
    pub op: OpId,
    pub kind: OpKind,
    pub payload: Payload,
}

/// Lifecycle notifications emitted by a view instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    LoadUnderway,
    LoadComplete,
    Failed,
    SelectionChanged,
}

/// A view notification, tagged with the slot and view instance it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSignal {
    pub slot: SlotId,
    pub view: ViewKey,
    pub event: ViewEvent,
}

/// Anything that can arrive in the controller's mailbox.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Completion(Completion),
    View(ViewSignal),
}

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// An outstanding operation: identity, cancellation and reply path.
#[derive(Debug, Clone)]
pub struct Ticket {
    pub slot: SlotId,
    pub op: OpId,
    pub kind: OpKind,
    pub token: CancelToken,
    reply: Sender<Message>,
}

impl Ticket {
    pub fn new(slot: SlotId, op: OpId, kind: OpKind, token: CancelToken, reply: Sender<Message>) -> Self {
        Self {
            slot,
            op,
            kind,
            token,
            reply,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Deliver the final result. A closed mailbox means the controller is
    /// gone and the reply is dropped.
    pub fn complete(self, payload: Payload) {
        self.notify(payload);
    }

    /// Deliver a result without consuming the ticket (watch notifications).
    pub fn notify(&self, payload: Payload) {
        let msg = Message::Completion(Completion {
            slot: self.slot,
            op: self.op,
            kind: self.kind,
            payload,
        });
        if self.reply.send(msg).is_err() {
            log::debug!("{} {}: mailbox closed, reply dropped", self.slot, self.op);
        }
    }
}

// ---------------------------------------------------------------------------
// Mailbox
// ---------------------------------------------------------------------------

/// Single queue that all completions and view signals flow into.
#[derive(Debug)]
pub struct Mailbox {
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// A new sender feeding this mailbox.
    pub fn sender(&self) -> Sender<Message> {
        self.tx.clone()
    }

    /// Next queued message, if any.
    pub fn try_next(&self) -> Option<Message> {
        match self.rx.try_recv() {
            Ok(msg) => Some(msg),
            // The mailbox holds its own sender, so it never disconnects.
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::Location;

    fn ticket(mailbox: &Mailbox, kind: OpKind) -> Ticket {
        Ticket::new(SlotId(1), OpId(5), kind, CancelToken::new(), mailbox.sender())
    }

    #[test]
    fn token_clones_share_state() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(a.same_as(&b));
        assert!(!a.same_as(&CancelToken::new()));
        b.cancel();
        assert!(a.is_cancelled());
    }

    #[test]
    fn attributes_combine() {
        let attrs = Attributes::INFO | Attributes::MOUNT;
        assert!(attrs.contains(Attributes::INFO));
        assert!(attrs.contains(Attributes::MOUNT));
        assert!(!attrs.contains(Attributes::METADATA));
        assert!(attrs.contains(Attributes::NONE));
    }

    #[test]
    fn complete_posts_tagged_completion() {
        let mailbox = Mailbox::new();
        let t = ticket(&mailbox, OpKind::Mount);
        t.complete(Payload::Mounted(Ok(())));
        let msg = mailbox.try_next().unwrap();
        assert_eq!(
            msg,
            Message::Completion(Completion {
                slot: SlotId(1),
                op: OpId(5),
                kind: OpKind::Mount,
                payload: Payload::Mounted(Ok(())),
            })
        );
        assert!(mailbox.try_next().is_none());
    }

    #[test]
    fn notify_can_repeat() {
        let mailbox = Mailbox::new();
        let t = ticket(&mailbox, OpKind::Watch);
        t.notify(Payload::FileChanged(FileChange::Changed));
        let to = Location::parse("/b").unwrap();
        t.notify(Payload::FileChanged(FileChange::Renamed(to)));
        assert!(mailbox.try_next().is_some());
        assert!(mailbox.try_next().is_some());
        assert!(mailbox.try_next().is_none());
    }

    #[test]
    fn messages_keep_fifo_order() {
        let mailbox = Mailbox::new();
        let tx = mailbox.sender();
        for n in 0..3 {
            tx.send(Message::View(ViewSignal {
                slot: SlotId(n),
                view: ViewKey(n),
                event: ViewEvent::LoadUnderway,
            }))
            .unwrap();
        }
        for n in 0..3 {
            match mailbox.try_next() {
                Some(Message::View(signal)) => assert_eq!(signal.slot, SlotId(n)),
                other => panic!("unexpected {other:?}"),
            }
        }
    }
}
