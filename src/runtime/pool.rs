//! Worker pool that runs execute steps off the loop thread.
//!
//! The host supplies the pool through [`WorkerPool`]. [`ThreadPool`] is the
//! default implementation:
//! - A fixed set of named worker threads
//! - A bounded job channel; a full channel is reported, never waited on
//! - Jobs are independent and share no state through the pool
//!
//! Backpressure belongs entirely to the pool: when it refuses a job the
//! scheduler reports the [`SubmitError`] synchronously.

use crate::error::{BuildError, SubmitError};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, trace};

/// A unit of blocking work handed to a worker thread.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Pool of threads able to run blocking jobs.
pub trait WorkerPool: Send + Sync {
    /// Queues `job` for execution on some worker thread.
    ///
    /// Must not block the caller. A job that is accepted must eventually run.
    fn submit(&self, job: Job) -> Result<(), SubmitError>;
}

/// Fixed-size pool of named worker threads fed by a bounded channel.
pub struct ThreadPool {
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    capacity: usize,
}

impl ThreadPool {
    /// Starts `threads` workers sharing a queue of at most `capacity` pending jobs.
    ///
    /// # Arguments
    /// * `threads` - Number of worker threads to spawn
    /// * `capacity` - Jobs that may wait for a free worker before `submit` fails
    /// * `name_prefix` - Worker threads are named `<prefix>-<id>`
    ///
    /// # Returns
    /// The running pool, or [`BuildError::Spawn`] if a thread could not start
    pub fn new(threads: usize, capacity: usize, name_prefix: &str) -> Result<Self, BuildError> {
        let (sender, receiver) = bounded::<Job>(capacity);
        let mut workers = Vec::with_capacity(threads);

        for id in 0..threads {
            let jobs = receiver.clone();
            let handle = thread::Builder::new()
                .name(format!("{}-{}", name_prefix, id))
                .spawn(move || worker_loop(id, jobs))
                .map_err(|source| BuildError::Spawn { id, source })?;

            workers.push(handle);
        }

        debug!(threads, capacity, "worker pool started");

        Ok(Self {
            sender: Some(sender),
            workers,
            capacity,
        })
    }

    pub fn threads(&self) -> usize {
        self.workers.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl WorkerPool for ThreadPool {
    fn submit(&self, job: Job) -> Result<(), SubmitError> {
        let sender = self.sender.as_ref().ok_or(SubmitError::ShutDown)?;

        match sender.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(SubmitError::Saturated {
                capacity: self.capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(SubmitError::ShutDown),
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        // Closing the channel lets every worker finish its queue and exit.
        self.sender.take();

        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("worker thread panicked");
            }
        }

        debug!("worker pool stopped");
    }
}

fn worker_loop(id: usize, jobs: Receiver<Job>) {
    trace!(worker = id, "worker started");

    while let Ok(job) = jobs.recv() {
        job();
    }

    trace!(worker = id, "worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier, mpsc};

    #[test]
    fn runs_jobs_on_named_threads() {
        let pool = ThreadPool::new(2, 8, "pool-test").unwrap();
        assert_eq!(pool.threads(), 2);
        let (tx, rx) = mpsc::channel();

        for _ in 0..4 {
            let tx = tx.clone();
            pool.submit(Box::new(move || {
                let name = thread::current().name().map(str::to_string);
                tx.send(name).unwrap();
            }))
            .unwrap();
        }

        for _ in 0..4 {
            let name = rx.recv().unwrap().unwrap();
            assert!(name.starts_with("pool-test-"));
        }
    }

    #[test]
    fn full_queue_is_reported() {
        let pool = ThreadPool::new(1, 1, "pool-full").unwrap();
        let gate = Arc::new(Barrier::new(2));
        let started = Arc::new(Barrier::new(2));

        // Occupy the only worker until the test releases it.
        let hold = gate.clone();
        let running = started.clone();
        pool.submit(Box::new(move || {
            running.wait();
            hold.wait();
        }))
        .unwrap();
        started.wait();

        // One job fits in the channel, the next one does not.
        pool.submit(Box::new(|| {})).unwrap();
        let err = pool.submit(Box::new(|| {})).unwrap_err();
        assert_eq!(err, SubmitError::Saturated { capacity: 1 });

        gate.wait();
    }

    #[test]
    fn drop_drains_pending_jobs() {
        let counter = Arc::new(AtomicUsize::new(0));

        {
            let pool = ThreadPool::new(2, 16, "pool-drain").unwrap();
            for _ in 0..10 {
                let counter = counter.clone();
                pool.submit(Box::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }))
                .unwrap();
            }
        }

        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }
}
