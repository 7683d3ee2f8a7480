//! Error types for the file I/O bridge.
//!
//! Two layers live side by side:
//! - [`ErrorResult`](crate::host::ErrorResult) is the plain errno carrier that crosses
//!   the worker/loop boundary as data.
//! - [`FileIoError`] is the Rust-side taxonomy used by entry points before and
//!   around scheduling. Every variant maps to an errno so it can be thrown as a
//!   host error.

use crate::host::{Env, ErrorResult, Exception};

use thiserror::Error;

/// Errors raised synchronously by entry points and the scheduler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FileIoError {
    /// Argument count outside the accepted range
    #[error("Number of arguments unmatched")]
    ArgumentCount {
        min: usize,
        max: usize,
        actual: usize,
    },

    /// Argument present but of the wrong kind
    #[error("Invalid {0}")]
    InvalidArgument(&'static str),

    /// Path argument could not be decoded as a UTF-8 string
    #[error("Invalid path")]
    InvalidPath,

    /// Filesystem failure reported by the platform
    #[error("{0}")]
    Io(ErrorResult),

    /// The worker pool refused the work item
    #[error("Failed to queue async work '{name}': {source}")]
    Submission {
        name: String,
        #[source]
        source: SubmitError,
    },

    /// A module property could not be registered
    #[error("Failed to export '{class}'")]
    Export { class: String },
}

impl FileIoError {
    /// Platform error number this error is reported with.
    pub fn errno(&self) -> i32 {
        match self {
            FileIoError::ArgumentCount { .. }
            | FileIoError::InvalidArgument(_)
            | FileIoError::InvalidPath
            | FileIoError::Export { .. } => libc::EINVAL,
            FileIoError::Io(err) => err.code(),
            FileIoError::Submission { source, .. } => source.errno(),
        }
    }

    /// Converts the error into a thrown host exception.
    pub fn throw(&self, env: &Env) -> Exception {
        match self {
            FileIoError::Io(err) => err.throw(env, None),
            other => ErrorResult::from_errno(other.errno()).throw(env, Some(&other.to_string())),
        }
    }
}

impl From<ErrorResult> for FileIoError {
    fn from(err: ErrorResult) -> Self {
        FileIoError::Io(err)
    }
}

/// Errors returned by a [`WorkerPool`](crate::runtime::WorkerPool) when a job cannot be queued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Every slot of the pending-job queue is taken
    #[error("worker queue is full ({capacity} pending jobs)")]
    Saturated { capacity: usize },

    /// The pool no longer accepts jobs
    #[error("worker pool has shut down")]
    ShutDown,
}

impl SubmitError {
    fn errno(&self) -> i32 {
        match self {
            SubmitError::Saturated { .. } => libc::EAGAIN,
            SubmitError::ShutDown => libc::ECANCELED,
        }
    }
}

/// Errors returned by [`RuntimeBuilder::build`](crate::RuntimeBuilder::build).
#[derive(Error, Debug)]
pub enum BuildError {
    /// Worker count outside the accepted range
    #[error("worker_threads must be between 1 and {max}, got {requested}")]
    WorkerThreads { requested: usize, max: usize },

    /// Pending-job queue must hold at least one job
    #[error("queue_capacity must be at least 1")]
    QueueCapacity,

    /// A worker thread could not be started
    #[error("failed to spawn worker thread {id}: {source}")]
    Spawn {
        id: usize,
        #[source]
        source: std::io::Error,
    },
}
