//! Fluent builder for Runtime construction.
//!
//! Provides a builder pattern interface for sizing the worker pool or plugging
//! in a host supplied one.

use crate::error::BuildError;
use crate::runtime::{Runtime, ThreadPool, WorkerPool};

use std::sync::Arc;

/// Upper bound on worker threads.
pub const MAX_WORKERS: usize = 512;

/// Default number of jobs that may wait for a free worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default prefix for worker thread names.
pub const DEFAULT_THREAD_NAME: &str = "fileio-worker";

/// Builder for constructing Runtime instances with fluent API.
///
/// # Example
/// ```ignore
/// let rt = RuntimeBuilder::new().worker_threads(4).build()?;
/// ```
pub struct RuntimeBuilder {
    worker_threads: usize,
    queue_capacity: usize,
    thread_name: String,
    pool: Option<Arc<dyn WorkerPool>>,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    /// Creates a builder with one worker per available CPU.
    pub fn new() -> Self {
        Self {
            worker_threads: default_workers(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            pool: None,
        }
    }

    /// Sets the number of worker threads of the default pool.
    pub fn worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Sets how many jobs may wait for a free worker before submission fails.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Sets the prefix used to name worker threads.
    pub fn thread_name(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name = prefix.into();
        self
    }

    /// Uses a host supplied pool instead of starting worker threads.
    ///
    /// Thread count and queue capacity settings are ignored.
    pub fn worker_pool(mut self, pool: Arc<dyn WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Builds and returns a configured Runtime instance.
    pub fn build(self) -> Result<Runtime, BuildError> {
        if let Some(pool) = self.pool {
            return Ok(Runtime::with_pool(pool));
        }

        if self.worker_threads == 0 || self.worker_threads > MAX_WORKERS {
            return Err(BuildError::WorkerThreads {
                requested: self.worker_threads,
                max: MAX_WORKERS,
            });
        }

        if self.queue_capacity == 0 {
            return Err(BuildError::QueueCapacity);
        }

        let pool = ThreadPool::new(self.worker_threads, self.queue_capacity, &self.thread_name)?;

        Ok(Runtime::with_pool(Arc::new(pool)))
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
        .min(MAX_WORKERS)
}
