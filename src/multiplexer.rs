//! The interface adapters: three compatibility shells over [`call::run`],
//! the classic descriptor-array call, its signal-masked variant, and the
//! bitset (`select`-style) call.

use std::time::{Duration, Instant};

use compio_log::instrument;

use crate::{
    call::{self, Deadline},
    config::MultiplexerConfig,
    interest::{Interest, Ready},
    object::FileTable,
    request::FdRequest,
    scheduler::{Scheduler, StdScheduler},
    select::FdSet,
};

/// Entry point for the three multiplex calls, holding a [`MultiplexerConfig`]
/// and a [`Scheduler`].
///
/// Build once with a settled config, then call the adapters as methods.
pub struct Multiplexer<S: Scheduler = StdScheduler> {
    config: MultiplexerConfig,
    scheduler: S,
}

impl Multiplexer<StdScheduler> {
    /// A multiplexer with default configuration and the `std::thread`-backed
    /// scheduler.
    pub fn new() -> Self {
        Self::with_scheduler(MultiplexerConfig::default(), StdScheduler)
    }
}

impl Default for Multiplexer<StdScheduler> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scheduler> Multiplexer<S> {
    /// Build a multiplexer over a specific config and scheduler.
    pub fn with_scheduler(config: MultiplexerConfig, scheduler: S) -> Self {
        Self { config, scheduler }
    }

    /// The array multiplex call: block until one of `fds` is ready for its
    /// requested interest, or `timeout_ms` elapses.
    ///
    /// Returns the number of entries with a non-empty `ready` mask on
    /// success, `0` on pure timeout, and an error otherwise. Entries not
    /// examined because an earlier probe in the array failed are left
    /// exactly as the caller initialized them.
    pub fn multiplex(
        &self,
        objects: &dyn FileTable,
        fds: &mut [FdRequest],
        timeout_ms: i32,
    ) -> std::io::Result<usize> {
        instrument!(compio_log::Level::DEBUG, "multiplex", nfds = fds.len(), timeout_ms);
        let deadline = Deadline::from_timeout_ms(self.scheduler.now(), timeout_ms);
        call::run(fds, deadline, objects, &self.scheduler, &self.config)
    }

    /// The bitset multiplex call: translate up to three descriptor sets
    /// into a temporary [`FdRequest`] array, run the array multiplex, and
    /// translate the result back.
    ///
    /// On error the bitsets are left unchanged. On success all three are
    /// cleared, then re-populated from whichever requests came back ready;
    /// the return value is the total number of bits set across all three.
    pub fn multiplex_sets(
        &self,
        objects: &dyn FileTable,
        nfds: usize,
        mut read: Option<&mut FdSet>,
        mut write: Option<&mut FdSet>,
        mut except: Option<&mut FdSet>,
        timeout: Option<Duration>,
    ) -> std::io::Result<usize> {
        instrument!(compio_log::Level::DEBUG, "multiplex_sets", nfds);

        // Two passes: first size the request array exactly (rather than
        // the source's `malloc(nfds * sizeof(pollfd))` overestimate), then
        // fill it in.
        let count = (0..nfds as i32)
            .filter(|&fd| {
                read.as_deref().is_some_and(|s| s.contains(fd))
                    || write.as_deref().is_some_and(|s| s.contains(fd))
                    || except.as_deref().is_some_and(|s| s.contains(fd))
            })
            .count();

        let mut requests = Vec::with_capacity(count);
        for fd in 0..nfds as i32 {
            let mut interest = Interest::empty();
            if read.as_deref().is_some_and(|s| s.contains(fd)) {
                interest |= Interest::READ;
            }
            if write.as_deref().is_some_and(|s| s.contains(fd)) {
                interest |= Interest::WRITE;
            }
            if except.as_deref().is_some_and(|s| s.contains(fd)) {
                interest |= Interest::ERROR;
            }
            if !interest.is_empty() {
                requests.push(FdRequest::new(fd, interest));
            }
        }

        let deadline = Deadline::from_duration(self.scheduler.now(), timeout);
        let timeout_ms = deadline_to_timeout_ms(deadline);
        let outcome = self.multiplex(objects, &mut requests, timeout_ms);

        let ready_count = outcome?;
        if let Some(set) = read.as_deref_mut() {
            set.clear();
        }
        if let Some(set) = write.as_deref_mut() {
            set.clear();
        }
        if let Some(set) = except.as_deref_mut() {
            set.clear();
        }

        if ready_count == 0 {
            return Ok(0);
        }

        let mut total = 0usize;
        for req in &requests {
            if req.ready.contains(Ready::READ) {
                if let Some(set) = read.as_deref_mut() {
                    set.insert(req.fd);
                    total += 1;
                }
            }
            if req.ready.contains(Ready::WRITE) {
                if let Some(set) = write.as_deref_mut() {
                    set.insert(req.fd);
                    total += 1;
                }
            }
            if req.ready.contains(Ready::ERROR) {
                if let Some(set) = except.as_deref_mut() {
                    set.insert(req.fd);
                    total += 1;
                }
            }
        }
        Ok(total)
    }
}

/// Deadlines already resolved to an instant need to be re-expressed in
/// milliseconds to re-enter the array multiplex's timeout contract; this
/// loses no precision that matters since the array call re-derives its own
/// `Instant` deadline from the same clock immediately afterwards.
fn deadline_to_timeout_ms(deadline: Deadline) -> i32 {
    match deadline {
        Deadline::Never => -1,
        Deadline::Immediate => 0,
        Deadline::At(instant) => {
            let now = Instant::now();
            let remaining = instant.saturating_duration_since(now);
            i32::try_from(remaining.as_millis()).unwrap_or(i32::MAX).max(1)
        }
    }
}

#[cfg(unix)]
mod sigmask {
    use std::{io, mem::MaybeUninit};

    /// A signal set, the `sigprocmask`/`pthread_sigmask` argument type.
    pub struct SigSet(libc::sigset_t);

    impl SigSet {
        /// An empty set.
        pub fn empty() -> io::Result<Self> {
            let mut set = MaybeUninit::uninit();
            // SAFETY: `set` is a valid out-pointer for `sigemptyset`.
            if unsafe { libc::sigemptyset(set.as_mut_ptr()) } != 0 {
                return Err(io::Error::last_os_error());
            }
            // SAFETY: just initialized by `sigemptyset` above.
            Ok(Self(unsafe { set.assume_init() }))
        }

        /// Add `signum` to the set.
        pub fn add(&mut self, signum: i32) -> io::Result<()> {
            // SAFETY: `self.0` is a valid, initialized `sigset_t`.
            if unsafe { libc::sigaddset(&mut self.0, signum) } != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }
    }

    impl<S: super::Scheduler> super::Multiplexer<S> {
        /// The signal-masked multiplex call: atomically install `sigmask`
        /// as the blocked-signal set for the duration of the call, run the
        /// array multiplex, then restore the previous set.
        ///
        /// If either mask operation fails, that error is propagated. If the
        /// multiplex itself returned a pure timeout (`Ok(0)`) but the
        /// restore failed, the restore's error takes precedence: a
        /// positive or already-erroring result is never overwritten by a
        /// failed restore.
        pub fn multiplex_sig(
            &self,
            objects: &dyn super::FileTable,
            fds: &mut [super::FdRequest],
            timeout: Option<std::time::Duration>,
            sigmask: Option<&SigSet>,
        ) -> io::Result<usize> {
            let deadline = super::Deadline::from_duration(self.scheduler_now(), timeout);
            let timeout_ms = super::deadline_to_timeout_ms(deadline);

            let previous = match sigmask {
                Some(mask) => {
                    let mut previous = MaybeUninit::uninit();
                    // SAFETY: `mask.0` is valid; `previous` is a valid out-pointer.
                    let rc = unsafe {
                        libc::pthread_sigmask(libc::SIG_SETMASK, &mask.0, previous.as_mut_ptr())
                    };
                    if rc != 0 {
                        return Err(io::Error::from_raw_os_error(rc));
                    }
                    // SAFETY: just initialized by `pthread_sigmask` above.
                    Some(unsafe { previous.assume_init() })
                }
                None => None,
            };

            let result = self.multiplex(objects, fds, timeout_ms);

            if let Some(previous) = previous {
                // SAFETY: `previous` is a valid, initialized `sigset_t`.
                let restore_rc = unsafe {
                    libc::pthread_sigmask(libc::SIG_SETMASK, &previous, std::ptr::null_mut())
                };
                if restore_rc != 0 && matches!(result, Ok(0)) {
                    return Err(io::Error::from_raw_os_error(restore_rc));
                }
            }

            result
        }
    }

    impl<S: super::Scheduler> super::Multiplexer<S> {
        fn scheduler_now(&self) -> std::time::Instant {
            self.scheduler.now()
        }
    }
}

#[cfg(unix)]
pub use sigmask::SigSet;
