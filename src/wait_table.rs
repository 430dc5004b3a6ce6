//! `WaitTable`: the bookkeeping of which object-internal queues the current
//! call has joined, so all of them can be torn down on the way out.
//!
//! An arena or a growable vector are equivalent here, both eliminating the
//! per-entry `free` dance an intrusive linked list would need under
//! interrupt mask: this is a plain `Vec`, every entry dropped in one pass
//! at [`WaitTable::teardown`].

use std::{sync::Arc, thread::Thread};

use crate::object::WaitQueue;

type Cleanup = Box<dyn FnOnce() + Send>;

/// One object-queue this call has joined.
///
/// An entry is appended during the registration scan but not linked into
/// its queue until the call actually decides to park (`thread` is `None`
/// until then). A call that finds readiness during registration, or that
/// has a zero timeout, tears these down having never linked them at all.
pub struct WaitEntry {
    queue: Arc<dyn WaitQueue>,
    thread: Option<Thread>,
    cleanup: Option<Cleanup>,
}

impl WaitEntry {
    fn unlink_and_clean(&mut self) {
        if let Some(thread) = self.thread.take() {
            self.queue.unlink(&thread);
        }
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

/// Per-call collection of [`WaitEntry`] registrations.
///
/// Created empty at call entry, drained at call exit; never shared across
/// calls or touched by more than one thread, so no internal locking is
/// needed.
pub struct WaitTable {
    entries: Vec<WaitEntry>,
}

impl WaitTable {
    /// An empty table, pre-sized for the common one-or-two-fd case.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Append a fresh entry for `queue`, with no cleanup.
    ///
    /// Fails with [`crate::error::nomem`] if the backing `Vec` cannot grow,
    /// surfaced via `try_reserve` rather than the default allocator abort.
    /// This is what lets `ENOMEM` be a real, catchable error here instead
    /// of a process abort.
    pub fn add(&mut self, queue: Arc<dyn WaitQueue>) -> std::io::Result<&mut WaitEntry> {
        self.add_with_cleanup(queue, None)
    }

    /// Like [`WaitTable::add`], but runs `cleanup` exactly once when the
    /// entry is torn down (objects that need to unwind private state, e.g.
    /// a per-poll lock counter, register one of these).
    pub fn add_with_cleanup(
        &mut self,
        queue: Arc<dyn WaitQueue>,
        cleanup: Option<Cleanup>,
    ) -> std::io::Result<&mut WaitEntry> {
        self.entries
            .try_reserve(1)
            .map_err(|_| crate::error::nomem())?;
        self.entries.push(WaitEntry {
            queue,
            thread: None,
            cleanup,
        });
        Ok(self.entries.last_mut().expect("just pushed"))
    }

    /// In-order traversal over the joined queues.
    pub fn iter(&self) -> impl Iterator<Item = &WaitEntry> {
        self.entries.iter()
    }

    /// True once every entry has been handed a sleep record, i.e. once the
    /// call has actually parked at least once.
    pub(crate) fn is_linked(&self) -> bool {
        self.entries.first().is_some_and(|e| e.thread.is_some())
    }

    /// Stamp `thread` into every entry and link each into its queue.
    ///
    /// Called exactly once, immediately before the first park. Entries
    /// added after this point (there are none, by construction: the
    /// registration scan that populates the table always runs before the
    /// park loop) would not be covered, but nothing appends to the table
    /// past this call, so the invariant holds.
    pub(crate) fn link_all(&mut self, current: &Thread) {
        debug_assert!(!self.is_linked(), "link_all called more than once");
        for entry in &mut self.entries {
            entry.thread = Some(current.clone());
            entry.queue.link(current.clone());
        }
    }

    /// Unlink every entry from its queue (if linked), run its cleanup, and
    /// drop it. Safe to call on a table that was never linked (registration
    /// found readiness immediately, or the call had a zero timeout): such
    /// entries just get their cleanup run and are freed.
    pub fn teardown(&mut self) {
        for mut entry in self.entries.drain(..) {
            entry.unlink_and_clean();
        }
    }
}

impl Drop for WaitTable {
    fn drop(&mut self) {
        // `teardown` is called on every exit path in `call::run`; this is
        // the last-resort net for a path that forgot to, so a bug there
        // still unlinks and cleans up rather than leaking a queue entry.
        if !self.entries.is_empty() {
            self.teardown();
        }
    }
}
