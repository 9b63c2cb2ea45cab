//! Snapshot publication between the edit thread and its readers.
//!
//! ```text
//!   edit thread                         render thread (or any reader)
//!   ───────────                         ─────────────────────────────
//!   SnapshotPublisher                   SnapshotReader
//!     current: Arc<PointSet>  ─triple─→   current: Arc<PointSet>
//!     retired: [Arc<PointSet>]  buffer
//! ```
//!
//! Every reader gets its own triple buffer of `Arc<PointSet>`. Publishing
//! overwrites the slot, so the newest snapshot always wins: a reader that
//! missed ten publishes picks up the tenth on its next read, never an older
//! one. Writes and reads are wait-free, and a reader only ever sees a fully
//! built, immutable set.
//!
//! Reclamation never happens on the reader side. Every snapshot the
//! publisher has handed out stays referenced by the publisher (as `current`
//! or in `retired`) until `Arc::strong_count` shows the publisher is the only
//! owner left. Dropping an `Arc` on a reader is therefore always a plain
//! refcount decrement, never a free.

use std::sync::Arc;

use triple_buffer::{Input, Output, TripleBuffer};

use crate::envelope::point::PointSet;

/// Publisher side of one reader's slot.
struct Mailbox {
    tx: Input<Arc<PointSet>>,
    /// Shared with the reader; a count of 1 means the other side is gone
    link: Arc<()>,
}

impl Mailbox {
    fn is_abandoned(&self) -> bool {
        Arc::strong_count(&self.link) == 1
    }
}

/// Edit-side owner of the published snapshot.
pub struct SnapshotPublisher {
    current: Arc<PointSet>,
    next_version: u64,
    mailboxes: Vec<Mailbox>,
    retired: Vec<Arc<PointSet>>,
}

impl SnapshotPublisher {
    pub fn new(initial: PointSet) -> Self {
        Self {
            current: Arc::new(initial.with_version(0)),
            next_version: 1,
            mailboxes: Vec::new(),
            retired: Vec::new(),
        }
    }

    /// Create a reader seeded with the current snapshot.
    pub fn subscribe(&mut self) -> SnapshotReader {
        let (tx, rx) = TripleBuffer::new(&self.current).split();
        let link = Arc::new(());
        self.mailboxes.push(Mailbox {
            tx,
            link: Arc::clone(&link),
        });
        log::debug!(
            "snapshot reader subscribed at version {} ({} readers)",
            self.current.version(),
            self.mailboxes.len()
        );
        SnapshotReader {
            rx,
            current: Arc::clone(&self.current),
            link,
        }
    }

    /// The snapshot most recently published.
    pub fn current(&self) -> &Arc<PointSet> {
        &self.current
    }

    pub fn readers(&self) -> usize {
        self.mailboxes.len()
    }

    /// Replace the published snapshot. Returns the new version number.
    ///
    /// Never fails and never waits on readers: each reader's next
    /// [`SnapshotReader::current_points`] returns this snapshot (or a newer
    /// one).
    pub fn publish(&mut self, set: PointSet) -> u64 {
        let version = self.next_version;
        self.next_version += 1;

        let snapshot = Arc::new(set.with_version(version));
        let previous = std::mem::replace(&mut self.current, Arc::clone(&snapshot));
        self.retired.push(previous);

        self.forget_abandoned();
        for mailbox in &mut self.mailboxes {
            mailbox.tx.write(Arc::clone(&snapshot));
        }

        log::debug!("published snapshot v{} ({} points)", version, snapshot.len());
        self.collect_garbage();
        version
    }

    /// Drop retired snapshots no reader or mailbox still references.
    ///
    /// Returns how many are still alive.
    pub fn collect_garbage(&mut self) -> usize {
        self.forget_abandoned();
        let before = self.retired.len();
        self.retired.retain(|snapshot| Arc::strong_count(snapshot) > 1);
        let freed = before - self.retired.len();
        if freed > 0 {
            log::trace!("reclaimed {} snapshot(s), {} retired", freed, self.retired.len());
        }
        self.retired.len()
    }

    /// Number of superseded snapshots still waiting for readers to let go.
    pub fn retired(&self) -> usize {
        self.retired.len()
    }

    fn forget_abandoned(&mut self) {
        let before = self.mailboxes.len();
        self.mailboxes.retain(|mailbox| !mailbox.is_abandoned());
        let gone = before - self.mailboxes.len();
        if gone > 0 {
            log::debug!("{} snapshot reader(s) dropped", gone);
        }
    }
}

/// Reader-side handle. Wait-free and allocation-free.
pub struct SnapshotReader {
    rx: Output<Arc<PointSet>>,
    current: Arc<PointSet>,
    link: Arc<()>,
}

impl SnapshotReader {
    /// Pick up the newest published snapshot and return it.
    ///
    /// Constant work, independent of how often or how recently the
    /// publisher wrote.
    pub fn current_points(&mut self) -> &PointSet {
        let latest = self.rx.read();
        if !Arc::ptr_eq(latest, &self.current) {
            // The publisher still owns the old snapshot, so this never frees
            self.current = Arc::clone(latest);
        }
        &self.current
    }

    /// Last snapshot picked up, without checking for a newer one.
    pub fn latest(&self) -> &PointSet {
        &self.current
    }

    pub fn version(&self) -> u64 {
        self.current.version()
    }

    /// `true` once the publisher has been dropped.
    pub fn is_orphaned(&self) -> bool {
        Arc::strong_count(&self.link) == 1
    }
}
