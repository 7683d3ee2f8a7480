//! Native file I/O module with a loop/worker async bridge.
//!
//! Script code runs on a single loop thread. Blocking filesystem work is handed
//! to a worker pool and its result is delivered back on the loop thread, either
//! by settling a promise or by invoking a callback.
//!
//! # Architecture
//!
//! - **Runtime**: Owns the loop thread context, runs a script and drains completions until idle
//! - **RuntimeBuilder**: Fluent builder for worker count, queue capacity and thread names
//! - **ThreadPool**: Bounded worker pool executing `Send` jobs
//! - **AsyncWork**: One-shot bridge pairing an execute step with a complete step
//! - **Host values**: `Value`, `Object`, `Function`, `Promise` and `ErrorResult`
//! - **fs**: Directory streams and the recursive `remove_tree`
//! - **module**: The export table (`rmdir`, `rmdirSync`, `opendirSync`)

mod builder;
mod error;
mod utils;

pub mod async_work;
pub mod fs;
pub mod host;
pub mod module;
pub mod runtime;

pub use async_work::{AsyncWork, CompletionMode};
pub use builder::RuntimeBuilder;
pub use error::{BuildError, FileIoError, SubmitError};
pub use fs::remove_tree;
pub use host::{
    ArrayBuffer, CallbackInfo, Deferred, ERRNO_NOERR, ErrorResult, Exception, Function, HostError,
    HostResult, Object, Promise, PromiseState, PropertyDescriptor, Value, ValueType,
};
pub use module::init;
pub use runtime::{Env, Job, Runtime, ThreadPool, WorkerPool, is_loop_thread};
