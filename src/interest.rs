//! Event bitmasks shared by [`crate::request::FdRequest`] and [`ObjOps`].
//!
//! POSIX's `pollfd` uses one set of `POLL*` constants for both `events`
//! (what's wanted) and `revents` (what's found); `Interest` and `Ready`
//! are type aliases of the same [`Events`] bitflags rather than two
//! unrelated types, for the same reason: a caller can legitimately ask
//! for `ERROR`/`HUP`/`PRI` the same way it asks for `READ`/`WRITE`, and an
//! object can legitimately report back exactly the bits it was asked
//! about.
//!
//! [`ObjOps`]: crate::object::ObjOps

bitflags::bitflags! {
    /// One event bit. Shared by `interest` (what a caller asks about) and
    /// `ready` (what an object reports back).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Events: u32 {
        /// Readable data, or (for a listening socket) a pending connection.
        const READ = 1 << 0;
        /// Writable buffer space.
        const WRITE = 1 << 1;
        /// An error condition.
        const ERROR = 1 << 2;
        /// The peer hung up.
        const HUP = 1 << 3;
        /// Out-of-band / priority data.
        const PRI = 1 << 4;
        /// The descriptor did not resolve to a pollable object. Only ever
        /// meaningful in `ready`, never set by a caller in `interest`.
        const NVAL = 1 << 5;
    }
}

/// Events a caller asks an object to report on.
pub type Interest = Events;

/// Events an object reports back, a superset of what was asked for: an
/// object may report `ERROR`/`HUP`/`NVAL` unconditionally, regardless of
/// `interest`.
pub type Ready = Events;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_and_write_compose() {
        let interest = Interest::READ | Interest::WRITE;
        assert!(interest.contains(Events::READ));
        assert!(interest.contains(Events::WRITE));
        assert!(!interest.contains(Events::ERROR));
    }
}
