//! The quantified invariants from the testable-properties section: no-leak,
//! no-lost-wake, and idempotent-zero-timeout, checked against a mock
//! object that counts its own queue traffic rather than a real descriptor.

use std::{
    io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread::Thread,
    time::{Duration, Instant},
};

use waitcore::{FdRequest, FileTable, Interest, ObjHandle, ObjOps, Ready, WaitQueue, WaitTable};

/// A queue that counts net link/unlink traffic, to check the no-leak
/// invariant directly instead of inferring it from absence of a panic.
#[derive(Default)]
struct CountingQueue {
    linked: AtomicUsize,
    unlinked: AtomicUsize,
    waiters: Mutex<Vec<Thread>>,
}

impl WaitQueue for CountingQueue {
    fn link(&self, thread: Thread) {
        self.linked.fetch_add(1, Ordering::SeqCst);
        self.waiters.lock().unwrap().push(thread);
    }

    fn unlink(&self, thread: &Thread) {
        self.unlinked.fetch_add(1, Ordering::SeqCst);
        let mut waiters = self.waiters.lock().unwrap();
        if let Some(pos) = waiters.iter().position(|t| t.id() == thread.id()) {
            waiters.remove(pos);
        }
    }
}

impl CountingQueue {
    fn wake_all(&self) {
        for thread in self.waiters.lock().unwrap().drain(..) {
            thread.unpark();
        }
    }
}

/// An object that starts unready and becomes ready once `flip` is called,
/// linking callers onto a [`CountingQueue`] in the meantime.
struct Flippable {
    ready: std::sync::atomic::AtomicBool,
    queue: Arc<CountingQueue>,
}

impl Flippable {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            ready: std::sync::atomic::AtomicBool::new(false),
            queue: Arc::new(CountingQueue::default()),
        })
    }

    fn flip(&self) {
        self.ready.store(true, Ordering::SeqCst);
        self.queue.wake_all();
    }
}

impl ObjOps for Flippable {
    fn poll(&self, interest: Interest, wtable: Option<&mut WaitTable>) -> io::Result<Ready> {
        if self.ready.load(Ordering::SeqCst) {
            return Ok(interest);
        }
        if let Some(wtable) = wtable {
            wtable.add(self.queue.clone())?;
        }
        Ok(Ready::empty())
    }
}

struct OneObjectTable(Arc<dyn ObjOps>);
impl FileTable for OneObjectTable {
    fn resolve(&self, _fd: i32) -> io::Result<ObjHandle> {
        Ok(ObjHandle::new(self.0.clone()))
    }
}

/// No-leak: a call that parks and is woken links and unlinks its queue an
/// equal number of times.
#[test]
fn no_leak_across_a_park_and_wake() {
    let object = Flippable::new();
    let queue = object.queue.clone();
    let objects = OneObjectTable(object.clone());

    let flipper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(5));
        object.flip();
    });

    let mut fds = [FdRequest::new(0, Interest::READ)];
    let mux = waitcore::Multiplexer::new();
    let n = mux.multiplex(&objects, &mut fds, 1000).unwrap();
    flipper.join().unwrap();

    assert_eq!(n, 1);
    assert_eq!(
        queue.linked.load(Ordering::SeqCst),
        queue.unlinked.load(Ordering::SeqCst)
    );
    assert!(queue.linked.load(Ordering::SeqCst) >= 1);
}

/// No-lost-wake: register, wake, then yield. The rescan following that
/// first yield must observe readiness.
#[test]
fn no_lost_wake_when_flip_races_the_park() {
    let object = Flippable::new();
    let objects = OneObjectTable(object.clone());

    // Flip before the multiplex call even starts parking, simulating a
    // wake that arrives while the caller is still on its way to sleep.
    let flipper = std::thread::spawn(move || {
        object.flip();
    });
    flipper.join().unwrap();

    let mut fds = [FdRequest::new(0, Interest::READ)];
    let mux = waitcore::Multiplexer::new();
    let start = Instant::now();
    let n = mux.multiplex(&objects, &mut fds, 1000).unwrap();

    assert_eq!(n, 1);
    assert!(start.elapsed() < Duration::from_millis(200));
}

/// Idempotent-zero-timeout: a zero-timeout call against an unready object
/// never links the object's queue.
#[test]
fn zero_timeout_never_links_the_queue() {
    let object = Flippable::new();
    let queue = object.queue.clone();
    let objects = OneObjectTable(object);

    let mut fds = [FdRequest::new(0, Interest::READ)];
    let mux = waitcore::Multiplexer::new();
    let n = mux.multiplex(&objects, &mut fds, 0).unwrap();

    assert_eq!(n, 0);
    assert_eq!(queue.linked.load(Ordering::SeqCst), 0);
}

/// Deadline-upper-bound: with no descriptor ever becoming ready, a
/// positive timeout returns within that timeout plus one scheduler tick.
#[test]
fn deadline_upper_bound_is_respected() {
    struct NeverReady;
    impl ObjOps for NeverReady {
        fn poll(&self, _interest: Interest, _wtable: Option<&mut WaitTable>) -> io::Result<Ready> {
            Ok(Ready::empty())
        }
    }

    let objects = OneObjectTable(Arc::new(NeverReady));
    let mut fds = [FdRequest::new(0, Interest::READ)];
    let mux = waitcore::Multiplexer::new();

    let start = Instant::now();
    let n = mux.multiplex(&objects, &mut fds, 30).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(n, 0);
    assert!(elapsed >= Duration::from_millis(30));
    assert!(elapsed < Duration::from_millis(130), "elapsed = {elapsed:?}");
}
