//! A descriptor-set readiness multiplexer: block until one of several
//! objects becomes ready for reading, writing, or error reporting, or until
//! a deadline expires.
//!
//! This crate implements the core only: the `WaitTable` bookkeeping, the
//! scan engine that dispatches a readiness probe per descriptor, the
//! block/wake protocol that parks and rescans without losing a wakeup, and
//! the three classic call shapes built on top of it ([`multiplex`],
//! [`multiplex_sig`], [`multiplex_sets`]). What a descriptor actually *is*,
//! a socket, a pipe, a console, is out of scope: objects are anything
//! implementing [`ObjOps`], resolved through anything implementing
//! [`FileTable`].
//!
//! [`multiplex`]: Multiplexer::multiplex
//! [`multiplex_sig`]: Multiplexer::multiplex_sig
//! [`multiplex_sets`]: Multiplexer::multiplex_sets

#![warn(missing_docs)]

mod call;
mod error;
mod multiplexer;
mod scan;

pub mod config;
pub mod interest;
pub mod object;
pub mod queue;
pub mod request;
pub mod scheduler;
pub mod select;
pub mod wait_table;

pub use config::MultiplexerConfig;
pub use interest::{Interest, Ready};
pub use multiplexer::Multiplexer;
#[cfg(unix)]
pub use multiplexer::SigSet;
pub use object::{FileTable, ObjHandle, ObjOps, WaitQueue};
pub use queue::ThreadWaitQueue;
pub use request::FdRequest;
pub use scheduler::{Scheduler, StdScheduler};
pub use select::FdSet;
pub use wait_table::{WaitEntry, WaitTable};
