//! Concrete `ObjOps`/`FileTable` collaborators for integration tests.
//!
//! Deliberately kept out of `src/`: the core treats "what a descriptor is"
//! as someone else's problem, so the pipe-backed object that makes these
//! tests concrete lives here instead of being shipped from the library
//! itself.

pub mod pipe2;

use std::{
    collections::HashMap,
    io,
    os::unix::io::{AsRawFd, OwnedFd, RawFd},
    sync::{Arc, Mutex},
};

use waitcore::{FileTable, ObjHandle, ObjOps, Interest, Ready, ThreadWaitQueue, WaitTable};

/// An object backed by one end of a real pipe.
///
/// Readiness is queried with a zero-timeout `poll(2)` on every probe. This
/// crate doesn't care how an object arrives at an answer, only that it
/// answers and, when asked, registers on its queue. Wakeups are driven
/// explicitly by [`PipeObject::notify`] rather than a background poller
/// thread, standing in for "another thread's I/O-completion path" (§5):
/// in these tests that other thread is the one writing to the pipe.
pub struct PipeObject {
    fd: OwnedFd,
    queue: Arc<ThreadWaitQueue>,
}

impl PipeObject {
    /// Wrap `fd` (either end of a pipe) behind a fresh object.
    pub fn new(fd: OwnedFd) -> Arc<Self> {
        Arc::new(Self {
            fd,
            queue: Arc::new(ThreadWaitQueue::new()),
        })
    }

    /// Wake every thread currently parked on this object's queue.
    ///
    /// Call this after performing whatever I/O made the object ready (e.g.
    /// right after a `write` lands bytes the read side can now see).
    pub fn notify(&self) {
        self.queue.wake_all();
    }

    fn raw_poll(&self, interest: Interest) -> io::Result<Ready> {
        let mut events: libc::c_short = 0;
        if interest.contains(Interest::READ) {
            events |= libc::POLLIN;
        }
        if interest.contains(Interest::WRITE) {
            events |= libc::POLLOUT;
        }

        let mut pfd = libc::pollfd {
            fd: self.fd.as_raw_fd(),
            events,
            revents: 0,
        };

        // SAFETY: `pfd` is a single, valid, stack-local pollfd; a zero
        // timeout makes this call non-blocking.
        let rc = unsafe { libc::poll(&mut pfd, 1, 0) };
        if rc < 0 {
            return Err(io::Error::last_os_error());
        }

        let mut ready = Ready::empty();
        if pfd.revents & libc::POLLIN != 0 {
            ready |= Ready::READ;
        }
        if pfd.revents & libc::POLLOUT != 0 {
            ready |= Ready::WRITE;
        }
        if pfd.revents & libc::POLLERR != 0 {
            ready |= Ready::ERROR;
        }
        if pfd.revents & libc::POLLHUP != 0 {
            ready |= Ready::HUP;
        }
        Ok(ready)
    }
}

impl ObjOps for PipeObject {
    fn poll(&self, interest: Interest, wtable: Option<&mut WaitTable>) -> io::Result<Ready> {
        let ready = self.raw_poll(interest)?;
        if !ready.is_empty() {
            return Ok(ready);
        }
        if let Some(wtable) = wtable {
            wtable.add(self.queue.clone())?;
        }
        Ok(Ready::empty())
    }
}

/// A descriptor table backed by a plain map, for tests that register a
/// handful of fixed descriptors up front.
#[derive(Default)]
pub struct MapFileTable(Mutex<HashMap<RawFd, Arc<dyn ObjOps>>>);

impl MapFileTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `object` under `fd`, replacing any previous registration.
    pub fn insert(&self, fd: RawFd, object: Arc<dyn ObjOps>) {
        self.0.lock().unwrap().insert(fd, object);
    }
}

impl FileTable for MapFileTable {
    fn resolve(&self, fd: RawFd) -> io::Result<ObjHandle> {
        self.0
            .lock()
            .unwrap()
            .get(&fd)
            .cloned()
            .map(ObjHandle::new)
            .ok_or_else(|| io::Error::from_raw_os_error(libc::EBADF))
    }
}
