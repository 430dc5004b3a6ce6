//! The scheduler boundary: current thread, monotonic clock, and the single
//! blocking primitive the core ever calls.
//!
//! A unikernel-style implementation masks interrupts around "join queues
//! → set not-runnable → hand off to scheduler" to avoid a lost wakeup
//! between the readiness check and going to sleep. `std::thread`'s
//! park/unpark pair already gives exactly that guarantee: unparking a
//! thread that hasn't parked yet leaves a token that the next `park` call
//! consumes immediately instead of sleeping. So the default [`Scheduler`]
//! built on it needs no separate interrupt-mask type; the atomicity is the
//! token, not a lock.

use std::{
    thread::{self, Thread},
    time::Instant,
};

/// What [`crate::call`] needs from the surrounding runtime.
///
/// A unikernel port would implement this over its own thread control block
/// and per-CPU IRQ mask; [`StdScheduler`] implements it over `std::thread`
/// for every other target.
pub trait Scheduler: Send + Sync {
    /// The monotonic clock `Call` compares deadlines against.
    fn now(&self) -> Instant;

    /// A handle to the thread making this call, suitable for use as the
    /// shared sleep record stamped into every [`WaitEntry`](crate::wait_table::WaitEntry).
    fn current_thread(&self) -> Thread;

    /// Block the current thread until unparked or `deadline` passes,
    /// whichever comes first. `None` means block with no deadline.
    fn park_until(&self, deadline: Option<Instant>);
}

/// The default [`Scheduler`], built directly on `std::thread`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdScheduler;

impl Scheduler for StdScheduler {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn current_thread(&self) -> Thread {
        thread::current()
    }

    fn park_until(&self, deadline: Option<Instant>) {
        match deadline {
            None => thread::park(),
            Some(deadline) => {
                let now = Instant::now();
                if deadline > now {
                    thread::park_timeout(deadline - now);
                }
                // else: deadline already passed; don't sleep at all, the
                // rescan that follows will observe the expiry.
            }
        }
    }
}
