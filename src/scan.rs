//! The scan engine: resolve one descriptor, probe it, update `ready`.

use std::io;

use compio_log::{instrument, trace, warn};

use crate::{
    interest::Ready,
    object::FileTable,
    request::FdRequest,
    wait_table::WaitTable,
};

/// Run one probe for `req`.
///
/// `wtable` is `Some` on the registration scan (register if not yet ready)
/// and `None` on every rescan after a wake (readiness-only, no new
/// registrations). Resolve, probe, release, update, return.
pub(crate) fn scan_one(
    objects: &dyn FileTable,
    req: &mut FdRequest,
    wtable: Option<&mut WaitTable>,
) -> io::Result<Ready> {
    instrument!(compio_log::Level::TRACE, "scan_one", fd = req.fd);

    let handle = match objects.resolve(req.fd) {
        Ok(handle) => handle,
        Err(e) => {
            req.ready = Ready::NVAL;
            warn!("scan: fd {} did not resolve: {e}", req.fd);
            return Err(e);
        }
    };

    // `handle` is dropped at the end of this scope regardless of outcome,
    // releasing the file-table reference unconditionally.
    let result = handle.poll(req.interest, wtable);

    match &result {
        Ok(ready) if !ready.is_empty() => {
            req.ready = *ready;
            trace!("scan: fd {} ready with {:?}", req.fd, ready);
        }
        Ok(_) => trace!("scan: fd {} not ready", req.fd),
        Err(e) => warn!("scan: fd {} probe failed: {e}", req.fd),
    }

    result
}
