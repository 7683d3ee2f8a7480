//! Loop-thread environment handle.
//!
//! An [`Env`] is what native functions receive when the host calls them. It is
//! `!Send`: everything reachable through it belongs to the loop thread.

use crate::host::{Deferred, Exception, Promise};
use crate::runtime::WorkerPool;
use crate::runtime::queue::CompletionQueue;
use crate::utils::slab::Slab;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, warn};

type Microtask = Box<dyn FnOnce(&Env)>;

/// Uncaught exceptions kept until [`Env::take_uncaught_exceptions`] drains them.
pub const MAX_UNCAUGHT: usize = 64;

/// Loop-side half of a scheduled work item.
///
/// Kept on the loop thread until the worker reports the item finished.
pub(crate) struct PendingWork {
    pub(crate) name: String,
    pub(crate) finish: Box<dyn FnOnce(&Env)>,
}

/// Handle to the loop thread's host environment.
#[derive(Clone)]
pub struct Env {
    inner: Rc<EnvInner>,
}

struct EnvInner {
    queue: Arc<CompletionQueue>,
    pool: Arc<dyn WorkerPool>,
    pending: RefCell<Slab<PendingWork>>,
    microtasks: RefCell<VecDeque<Microtask>>,
    uncaught: RefCell<VecDeque<Exception>>,
}

impl Env {
    pub(crate) fn new(queue: Arc<CompletionQueue>, pool: Arc<dyn WorkerPool>) -> Self {
        Self {
            inner: Rc::new(EnvInner {
                queue,
                pool,
                pending: RefCell::new(Slab::new(16)),
                microtasks: RefCell::new(VecDeque::new()),
                uncaught: RefCell::new(VecDeque::new()),
            }),
        }
    }

    /// Creates a pending promise and the handle that settles it.
    pub fn create_promise(&self) -> (Deferred, Promise) {
        Promise::pending()
    }

    /// Number of scheduled work items whose completion has not run yet.
    pub fn in_flight(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Records an exception thrown by a callback that no script frame can catch.
    ///
    /// At most [`MAX_UNCAUGHT`] exceptions are kept; the oldest is dropped first.
    pub fn report_uncaught(&self, exception: Exception) {
        warn!(exception = ?exception.value(), "uncaught exception in completion callback");

        let mut uncaught = self.inner.uncaught.borrow_mut();
        if uncaught.len() == MAX_UNCAUGHT {
            uncaught.pop_front();
            debug!(limit = MAX_UNCAUGHT, "dropped oldest uncaught exception");
        }
        uncaught.push_back(exception);
    }

    /// Drains the exceptions recorded by [`Env::report_uncaught`], oldest first.
    ///
    /// # Returns
    /// The recorded exceptions; the list is empty afterwards
    pub fn take_uncaught_exceptions(&self) -> Vec<Exception> {
        self.inner.uncaught.borrow_mut().drain(..).collect()
    }

    pub(crate) fn enqueue_microtask<F>(&self, task: F)
    where
        F: FnOnce(&Env) + 'static,
    {
        self.inner.microtasks.borrow_mut().push_back(Box::new(task));
    }

    /// Runs microtasks until the queue is empty, including ones queued meanwhile.
    pub(crate) fn run_microtasks(&self) {
        loop {
            let next = self.inner.microtasks.borrow_mut().pop_front();
            match next {
                Some(task) => task(self),
                None => break,
            }
        }
    }

    pub(crate) fn has_pending_work(&self) -> bool {
        !self.inner.pending.borrow().is_empty()
    }

    pub(crate) fn register_work(&self, work: PendingWork) -> usize {
        self.inner.pending.borrow_mut().insert(work)
    }

    pub(crate) fn take_work(&self, id: usize) -> Option<PendingWork> {
        self.inner.pending.borrow_mut().remove(id)
    }

    pub(crate) fn completion_queue(&self) -> &Arc<CompletionQueue> {
        &self.inner.queue
    }

    pub(crate) fn pool(&self) -> &Arc<dyn WorkerPool> {
        &self.inner.pool
    }
}
