//! Runtime subsystem modules.

pub(crate) mod context;
mod core;
pub(crate) mod env;
pub mod pool;
pub(crate) mod queue;

pub use context::is_loop_thread;
pub(crate) use context::enter_context;
pub use core::Runtime;
pub use env::{Env, MAX_UNCAUGHT};
pub use pool::{Job, ThreadPool, WorkerPool};
