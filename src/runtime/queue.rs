//! Thread-safe queue of finished work items.
//!
//! Worker threads push the id of each work item whose execute step returned.
//! The loop thread pops ids and runs the matching completion step.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, PoisonError};

/// A thread-safe FIFO of completed work ids.
///
/// Uses a Mutex-wrapped VecDeque plus a condvar so the loop thread can sleep
/// while work is in flight.
pub(crate) struct CompletionQueue {
    ready: Mutex<VecDeque<usize>>,
    signal: Condvar,
}

impl CompletionQueue {
    pub(crate) fn new() -> Self {
        Self {
            ready: Mutex::new(VecDeque::new()),
            signal: Condvar::new(),
        }
    }

    /// Enqueues a finished work id and wakes the loop thread.
    pub(crate) fn push(&self, id: usize) {
        self.ready
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(id);
        self.signal.notify_one();
    }

    /// Blocks until a finished id is available.
    pub(crate) fn wait_pop(&self) -> usize {
        let mut ready = self.ready.lock().unwrap_or_else(PoisonError::into_inner);

        loop {
            if let Some(id) = ready.pop_front() {
                return id;
            }

            ready = self
                .signal
                .wait(ready)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}
