//! Errno-flavored [`io::Error`] constructors.
//!
//! The core never defines its own error enum, it speaks `std::io::Result`
//! at every boundary. These helpers just name the handful of errno values
//! callers care about, so call sites stay short rather than spelling out
//! `from_raw_os_error` everywhere.

use std::io;

/// A null `fds` pointer with `nfds > 0`, or a null bitset where one is
/// required in the source's C signature. Kept for symmetry with the other
/// two members of §7's caller-error taxonomy even though a safe Rust
/// signature (references, never null) can't actually produce it; a
/// `FileTable`/`ObjOps` implementor fronting a C ABI is the one place this
/// would realistically get raised.
#[allow(dead_code)]
pub fn fault() -> io::Error {
    #[cfg(unix)]
    {
        io::Error::from_raw_os_error(libc::EFAULT)
    }
    #[cfg(not(unix))]
    {
        io::Error::new(io::ErrorKind::InvalidInput, "bad address")
    }
}

/// A descriptor does not resolve in the file table, or an object's `poll`
/// refuses registration via the default stub.
pub fn badf() -> io::Error {
    #[cfg(unix)]
    {
        io::Error::from_raw_os_error(libc::EBADF)
    }
    #[cfg(not(unix))]
    {
        io::Error::new(io::ErrorKind::NotFound, "bad descriptor")
    }
}

/// [`crate::wait_table::WaitTable::add`] could not grow its backing storage.
pub fn nomem() -> io::Error {
    #[cfg(unix)]
    {
        io::Error::from_raw_os_error(libc::ENOMEM)
    }
    #[cfg(not(unix))]
    {
        io::Error::new(io::ErrorKind::OutOfMemory, "cannot allocate memory")
    }
}
