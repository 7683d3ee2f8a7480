//! Loop-thread runtime that runs a script and delivers async completions.
//!
//! The runtime coordinates a script body via `run` and the completion steps of
//! every work item it schedules. The thread calling `run` is the loop thread.

use crate::builder::RuntimeBuilder;
use crate::error::BuildError;
use crate::runtime::queue::CompletionQueue;
use crate::runtime::{Env, WorkerPool, enter_context};

use std::sync::Arc;

use tracing::{trace, warn};

/// Host runtime owning the loop thread's state and the worker pool.
///
/// Exceptions thrown by completion callbacks are kept on the [`Env`] until the
/// embedder drains them with [`Env::take_uncaught_exceptions`]. Only the most
/// recent [`MAX_UNCAUGHT`](crate::runtime::MAX_UNCAUGHT) are retained.
///
/// # Example
/// ```ignore
/// let mut rt = Runtime::new()?;
/// let exports = rt.run(|env| fileio::init(env))?;
/// ```
pub struct Runtime {
    env: Env,
    queue: Arc<CompletionQueue>,
}

impl Runtime {
    /// Creates a runtime with the default configuration.
    pub fn new() -> Result<Self, BuildError> {
        RuntimeBuilder::new().build()
    }

    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime on top of a host supplied worker pool.
    pub fn with_pool(pool: Arc<dyn WorkerPool>) -> Self {
        let queue = Arc::new(CompletionQueue::new());
        let env = Env::new(queue.clone(), pool);

        Self { env, queue }
    }

    /// Runs `script` on the calling thread, then drives the loop until idle.
    ///
    /// After the script returns, microtasks and completions are processed until
    /// no work item is in flight and no microtask is queued. Returns the
    /// script's value.
    ///
    /// # Example
    /// ```ignore
    /// let value = rt.run(|_env| 42);
    /// assert_eq!(value, 42);
    /// ```
    pub fn run<F, R>(&mut self, script: F) -> R
    where
        F: FnOnce(&Env) -> R,
    {
        enter_context(|| {
            let result = script(&self.env);

            loop {
                self.env.run_microtasks();

                if !self.env.has_pending_work() {
                    break;
                }

                // Nothing else can make progress until a worker reports back.
                let id = self.queue.wait_pop();
                self.complete(id);
            }

            result
        })
    }

    /// Number of work items scheduled but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.env.in_flight()
    }

    fn complete(&self, id: usize) {
        match self.env.take_work(id) {
            Some(work) => {
                trace!(work = %work.name, id, "running completion");
                (work.finish)(&self.env);
            }
            None => warn!(id, "completion reported for unknown work item"),
        }
    }
}
