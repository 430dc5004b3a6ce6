use crate::interest::{Interest, Ready};

/// A raw descriptor as understood by a [`FileTable`](crate::object::FileTable).
pub type RawFd = i32;

/// One entry of a caller's descriptor array: what to wait for on one `fd`,
/// and where to write what was found.
///
/// Owned by the caller for the duration of one [`Multiplexer::multiplex`]
/// call; the core reads `fd`/`interest` and writes `ready`, and never
/// retains a pointer into the slice after the call returns.
///
/// [`Multiplexer::multiplex`]: crate::multiplexer::Multiplexer::multiplex
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdRequest {
    /// Descriptor to resolve through the file table.
    pub fd: RawFd,
    /// Events the caller wants to know about.
    pub interest: Interest,
    /// Filled in on return. Callers should zero this before the call;
    /// entries the scan engine never reaches (because an earlier probe in
    /// the same array failed) are left exactly as the caller set them.
    pub ready: Ready,
}

impl FdRequest {
    /// Build a request with an empty `ready` mask, the way callers are
    /// expected to initialize one before a call.
    pub fn new(fd: RawFd, interest: Interest) -> Self {
        Self {
            fd,
            interest,
            ready: Ready::empty(),
        }
    }

    /// Whether this request came back with any bit set.
    pub fn is_ready(&self) -> bool {
        !self.ready.is_empty()
    }
}
