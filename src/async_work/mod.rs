//! One-shot bridge from the loop thread to a worker thread and back.
//!
//! A work item is split in two halves:
//! - The execute step is `Send`, captures only owned data and runs on a worker
//!   thread. It cannot touch host values because [`Value`] is `!Send`.
//! - The complete step stays on the loop thread, receives the execute step's
//!   result and turns it into a host value.
//!
//! How the host value reaches the script depends on the [`CompletionMode`]
//! chosen when the [`AsyncWork`] is created: a promise is settled, or a
//! callback is invoked with `(error, result)`.
//!
//! # Example
//!
//! ```ignore
//! let work = AsyncWork::new(env, this, None);
//! let promise = work.schedule(
//!     "Example",
//!     move || ErrorResult::OK,
//!     |env, err: ErrorResult| if err.is_err() { err.to_host_error(env) } else { Value::Undefined },
//! )?;
//! ```

mod state;

pub(crate) use state::{WorkState, WorkStatus};

use crate::error::FileIoError;
use crate::host::{Deferred, Function, HostError, Value};
use crate::runtime::env::PendingWork;
use crate::runtime::{Env, Job, is_loop_thread};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

/// How the complete step's value is delivered to the host.
pub enum CompletionMode {
    /// Settle a promise: reject on error values, resolve otherwise.
    Promise(Deferred),
    /// Invoke a callback with `(error, undefined)` or `(null, value)`.
    Callback(Function),
}

/// A work item being prepared on the loop thread.
pub struct AsyncWork {
    env: Env,
    this: Value,
    mode: CompletionMode,
    output: Value,
}

impl AsyncWork {
    /// Prepares a work item. A callback selects callback mode, its absence promise mode.
    pub fn new(env: &Env, this: Value, callback: Option<Function>) -> Self {
        let (mode, output) = match callback {
            Some(callback) => (CompletionMode::Callback(callback), Value::Undefined),
            None => {
                let (deferred, promise) = env.create_promise();
                (CompletionMode::Promise(deferred), Value::Promise(promise))
            }
        };

        Self {
            env: env.clone(),
            this,
            mode,
            output,
        }
    }

    pub fn mode(&self) -> &CompletionMode {
        &self.mode
    }

    /// Hands `execute` to the worker pool and returns immediately.
    ///
    /// `complete` runs later on the loop thread, exactly once, after `execute`
    /// has returned. A pool that refuses the job is reported here and neither
    /// step ever runs.
    ///
    /// # Arguments
    /// * `name` - Label used in logs and submission errors
    /// * `execute` - Blocking step run on a worker thread
    /// * `complete` - Turns the execute result into a host value on the loop thread
    ///
    /// # Returns
    /// The pending promise in promise mode, `undefined` in callback mode
    pub fn schedule<R, E, C>(self, name: &str, execute: E, complete: C) -> Result<Value, FileIoError>
    where
        R: Send + 'static,
        E: FnOnce() -> R + Send + 'static,
        C: FnOnce(&Env, R) -> Value + 'static,
    {
        self.schedule_tracked(name, execute, complete)
            .map(|(output, _)| output)
    }

    pub(crate) fn schedule_tracked<R, E, C>(
        self,
        name: &str,
        execute: E,
        complete: C,
    ) -> Result<(Value, Arc<WorkStatus>), FileIoError>
    where
        R: Send + 'static,
        E: FnOnce() -> R + Send + 'static,
        C: FnOnce(&Env, R) -> Value + 'static,
    {
        let AsyncWork {
            env,
            this,
            mode,
            output,
        } = self;

        let status = Arc::new(WorkStatus::new(name));
        let slot: Arc<Mutex<Option<R>>> = Arc::new(Mutex::new(None));

        let finish_status = status.clone();
        let finish_slot = slot.clone();
        let finish = move |env: &Env| {
            debug_assert!(is_loop_thread(), "completion must run on the loop thread");
            debug_assert!(finish_status.current() >= WorkState::Executing);
            finish_status.advance(WorkState::Completing);

            let result = finish_slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();

            let value = match result {
                Some(result) => complete(env, result),
                None => Value::Error(HostError::from_errno(
                    libc::EIO,
                    Some("Async work terminated abnormally"),
                )),
            };

            deliver(env, this, mode, value);
            finish_status.advance(WorkState::Released);
        };

        let id = env.register_work(PendingWork {
            name: name.to_string(),
            finish: Box::new(finish),
        });

        let worker_status = status.clone();
        let queue = env.completion_queue().clone();
        let work_name = name.to_string();
        let job: Job = Box::new(move || {
            worker_status.advance(WorkState::Executing);

            match panic::catch_unwind(AssertUnwindSafe(execute)) {
                Ok(result) => {
                    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
                }
                Err(payload) => {
                    warn!(work = %work_name, reason = panic_message(&*payload), "execute step panicked");
                }
            }

            queue.push(id);
        });

        if let Err(source) = env.pool().submit(job) {
            env.take_work(id);
            debug!(work = name, error = %source, "work submission refused");
            return Err(FileIoError::Submission {
                name: name.to_string(),
                source,
            });
        }

        status.advance(WorkState::Scheduled);
        debug!(work = name, id, "work scheduled");

        Ok((output, status))
    }
}

fn deliver(env: &Env, this: Value, mode: CompletionMode, value: Value) {
    match mode {
        CompletionMode::Promise(deferred) => {
            if value.is_error() {
                deferred.reject(env, value);
            } else {
                deferred.resolve(env, value);
            }
        }
        CompletionMode::Callback(callback) => {
            let args = if value.is_error() {
                vec![value, Value::Undefined]
            } else {
                vec![Value::Null, value]
            };

            if let Err(exception) = callback.call(env, this, args) {
                env.report_uncaught(exception);
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::SubmitError;
    use crate::host::{ErrorResult, PromiseState};
    use crate::runtime::{Runtime, WorkerPool};

    use std::thread;

    struct RefusingPool;

    impl WorkerPool for RefusingPool {
        fn submit(&self, _job: Job) -> Result<(), SubmitError> {
            Err(SubmitError::Saturated { capacity: 0 })
        }
    }

    fn runtime() -> Runtime {
        Runtime::builder().worker_threads(2).build().unwrap()
    }

    #[test]
    fn lifecycle_reaches_released() {
        let mut rt = runtime();

        let status = rt.run(|env| {
            let work = AsyncWork::new(env, Value::Undefined, None);
            let (_, status) = work
                .schedule_tracked("lifecycle", || 1_u8, |_, n| Value::from(i32::from(n)))
                .unwrap();
            assert!(status.current() >= WorkState::Scheduled);
            status
        });

        assert_eq!(status.current(), WorkState::Released);
        assert_eq!(rt.in_flight(), 0);
    }

    #[test]
    fn refused_submission_stays_created() {
        let mut rt = Runtime::with_pool(Arc::new(RefusingPool));

        rt.run(|env| {
            let work = AsyncWork::new(env, Value::Undefined, None);
            let err = work
                .schedule_tracked(
                    "refused",
                    || ErrorResult::OK,
                    |_, _| panic!("complete must not run"),
                )
                .unwrap_err();

            assert!(matches!(err, FileIoError::Submission { .. }));
            assert_eq!(env.in_flight(), 0);
        });
    }

    #[test]
    fn execute_runs_off_loop_and_complete_on_loop() {
        let mut rt = runtime();
        let loop_thread = thread::current().id();

        let promise = rt.run(|env| {
            let work = AsyncWork::new(env, Value::Undefined, None);
            work.schedule(
                "threads",
                || thread::current().id(),
                move |_, worker| {
                    assert!(is_loop_thread());
                    assert_eq!(thread::current().id(), loop_thread);
                    Value::from(worker != loop_thread)
                },
            )
            .unwrap()
        });

        match promise.as_promise().map(|p| p.state()) {
            Some(PromiseState::Fulfilled(value)) => assert_eq!(value.to_bool(), Some(true)),
            other => panic!("unexpected promise state: {:?}", other),
        }
    }

    #[test]
    fn panicking_execute_still_completes_with_error() {
        let mut rt = runtime();

        let promise = rt.run(|env| {
            let work = AsyncWork::new(env, Value::Undefined, None);
            work.schedule(
                "panics",
                || -> u8 { panic!("boom") },
                |_, _| panic!("complete must be skipped"),
            )
            .unwrap()
        });

        match promise.as_promise().map(|p| p.state()) {
            Some(PromiseState::Rejected(reason)) => {
                assert_eq!(reason.as_error().and_then(|e| e.code()), Some(libc::EIO));
            }
            other => panic!("unexpected promise state: {:?}", other),
        }
    }
}
