//! The boundary between the multiplexer core and its external collaborators:
//! the file table (resolves a descriptor to a handle) and the virtual-object
//! layer (dispatches a readiness probe to a type-specific handler).
//!
//! Neither is implemented here: the core only states the contract that
//! a descriptor-backed type and its registry must honor. Concrete objects
//! (pipes, sockets, consoles) are someone else's crate.

use std::{io, sync::Arc, thread::Thread};

use crate::{
    interest::{Interest, Ready},
    request::RawFd,
    wait_table::WaitTable,
};

/// A per-object wait queue: a place sleeping threads are linked while they
/// wait for this object to become ready.
///
/// Implementations are shared (an object may have many concurrent pollers)
/// and must serialize their own link/unlink/wake bookkeeping; the core
/// never locks on an object's behalf. [`link`](WaitQueue::link) may be
/// called more than once with the same [`Thread`] (duplicate descriptors in
/// one call, or the same object appearing in more than one [`FdRequest`]);
/// implementations must tolerate that, since unparking the same thread
/// twice is specified as a no-op by `std::thread::Thread::unpark`.
///
/// [`FdRequest`]: crate::request::FdRequest
pub trait WaitQueue: Send + Sync {
    /// Link a sleeping thread into this queue.
    fn link(&self, thread: Thread);

    /// Remove one linked occurrence of `thread` from this queue, if present.
    fn unlink(&self, thread: &Thread);
}

/// One object behind a descriptor: sockets, pipes, consoles, or anything
/// else a [`FileTable`] knows how to resolve.
///
/// The single operation objects expose is a readiness probe that optionally
/// registers the caller on the object's wait queue, mirroring the
/// source contract's `VOP_POLL(vnode, file, events, wtable, addq)` almost
/// verbatim, with `addq: bool` folded into `wtable: Option<&mut WaitTable>`.
pub trait ObjOps: Send + Sync {
    /// Report current readiness for `interest`, and if `wtable` is `Some`
    /// and the object is not currently ready, append one or more
    /// [`WaitEntry`](crate::wait_table::WaitEntry)s to it before returning
    /// `Ok(Ready::empty())`.
    ///
    /// Objects that don't override this use the default stub: it refuses
    /// to register and reports `EBADF`, unconditionally.
    fn poll(&self, interest: Interest, wtable: Option<&mut WaitTable>) -> io::Result<Ready> {
        let _ = (interest, wtable);
        Err(crate::error::badf())
    }
}

/// A refcounted handle to an object, as produced by a [`FileTable`] lookup.
///
/// Reference counting is `Arc`'s, not hand-rolled: the scan engine's
/// "release the file-table reference unconditionally" requirement falls
/// out of normal `Drop` rather than needing an explicit release call.
#[derive(Clone)]
pub struct ObjHandle(Arc<dyn ObjOps>);

impl ObjHandle {
    /// Wrap an object behind a fresh handle.
    pub fn new(obj: Arc<dyn ObjOps>) -> Self {
        Self(obj)
    }

    pub(crate) fn poll(&self, interest: Interest, wtable: Option<&mut WaitTable>) -> io::Result<Ready> {
        self.0.poll(interest, wtable)
    }
}

/// Resolves an integer descriptor to an [`ObjHandle`].
///
/// A conformant implementation returns the `EBADF`-class error from
/// [`crate::error::badf`] for an unknown descriptor.
pub trait FileTable: Send + Sync {
    /// Look up `fd`, returning a new refcounted reference on success.
    fn resolve(&self, fd: RawFd) -> io::Result<ObjHandle>;
}
