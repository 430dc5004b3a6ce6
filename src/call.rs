//! The block/wake protocol (C3): the heart of the core. Composes the scan
//! engine with a [`WaitTable`] and a [`Scheduler`], implementing the
//! SCANNING → PARKED → RESCANNING → DONE state machine from §4.3 of the
//! spec as a plain loop rather than the source's macro expansion.

use std::{
    io,
    time::{Duration, Instant},
};

use compio_log::{instrument, debug, trace};

use crate::{
    config::MultiplexerConfig,
    object::FileTable,
    request::FdRequest,
    scan::scan_one,
    scheduler::Scheduler,
    wait_table::WaitTable,
};

/// A call's deadline, resolved from the caller's millisecond/`Duration`
/// timeout per §4.3's conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Deadline {
    /// `timeout < 0`: wait indefinitely.
    Never,
    /// `timeout == 0`: do not park at all.
    Immediate,
    /// `timeout > 0`: an absolute instant to stop waiting at.
    At(Instant),
}

impl Deadline {
    /// §4.3's conversion, with the *intended* arithmetic (REDESIGN R1): a
    /// positive millisecond timeout becomes `now + timeout_ms` nanoseconds
    /// out, via `Duration::from_millis` rather than the source's
    /// microseconds-into-a-nanosecond-clock bug.
    pub(crate) fn from_timeout_ms(now: Instant, timeout_ms: i32) -> Self {
        match timeout_ms {
            i32::MIN..=-1 => Deadline::Never,
            0 => Deadline::Immediate,
            ms => Deadline::At(now + Duration::from_millis(ms as u64)),
        }
    }

    /// Variant of [`Deadline::from_timeout_ms`] for the `Option<Duration>`
    /// surface ([`crate::multiplexer::Multiplexer::multiplex_sig`] and
    /// [`crate::multiplexer::Multiplexer::multiplex_sets`]): `None` is
    /// `Never`, `Duration::ZERO` is `Immediate`.
    pub(crate) fn from_duration(now: Instant, timeout: Option<Duration>) -> Self {
        match timeout {
            None => Deadline::Never,
            Some(d) if d.is_zero() => Deadline::Immediate,
            Some(d) => Deadline::At(now + d),
        }
    }

    fn instant(self) -> Option<Instant> {
        match self {
            Deadline::Never => None,
            Deadline::Immediate => Some(Instant::now()),
            Deadline::At(t) => Some(t),
        }
    }

    fn has_passed(self, now: Instant) -> bool {
        matches!(self, Deadline::At(t) if now >= t)
    }
}

/// Run one full call: registration scan, and if nothing was ready and the
/// deadline allows it, park/rescan until something is ready or the
/// deadline passes.
///
/// Returns the number of entries in `fds` with a non-empty `ready` mask.
pub(crate) fn run(
    fds: &mut [FdRequest],
    deadline: Deadline,
    objects: &dyn FileTable,
    scheduler: &dyn Scheduler,
    config: &MultiplexerConfig,
) -> io::Result<usize> {
    instrument!(compio_log::Level::TRACE, "call::run", nfds = fds.len());

    let mut wtable = WaitTable::with_capacity(config.wait_table_capacity);

    // SCANNING: the registration scan. Every probe is given the table so it
    // can append entries if it isn't ready yet.
    let mut ready_count = 0usize;
    for req in fds.iter_mut() {
        match scan_one(objects, req, Some(&mut wtable)) {
            Ok(ready) if !ready.is_empty() => ready_count += 1,
            Ok(_) => {}
            Err(e) => {
                wtable.teardown();
                return Err(e);
            }
        }
    }

    if ready_count > 0 {
        debug!("call: {ready_count} fd(s) ready during registration scan, no park needed");
        wtable.teardown();
        return Ok(ready_count);
    }

    if matches!(deadline, Deadline::Immediate) {
        debug!("call: zero timeout, returning without parking");
        wtable.teardown();
        return Ok(0);
    }

    // PARKED / RESCANNING.
    let current = scheduler.current_thread();
    wtable.link_all(&current);

    let mut spurious_wakes = 0u32;
    loop {
        trace!("call: parking until {:?}", deadline.instant());
        scheduler.park_until(deadline.instant());

        // RESCANNING: no registration here, readiness-only.
        ready_count = 0;
        for req in fds.iter_mut() {
            match scan_one(objects, req, None) {
                Ok(ready) if !ready.is_empty() => ready_count += 1,
                Ok(_) => {}
                Err(e) => {
                    wtable.teardown();
                    return Err(e);
                }
            }
        }

        let now = scheduler.now();
        if ready_count > 0 || deadline.has_passed(now) {
            break;
        }

        if let Some(budget) = config.spurious_wake_budget {
            spurious_wakes += 1;
            if spurious_wakes > budget {
                wtable.teardown();
                return Err(crate::error::nomem());
            }
        }
    }

    debug!("call: done, ready_count = {ready_count}");
    wtable.teardown();
    Ok(ready_count)
}
