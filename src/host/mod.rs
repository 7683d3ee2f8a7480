//! Host value layer.
//!
//! Everything the loop thread uses to talk to scripts:
//! - [`value`]: opaque values and typed extraction
//! - [`object`]: objects, property descriptors and native payloads
//! - [`function`]: native functions and argument validation
//! - [`promise`]: deferred values
//! - [`buffer`]: byte buffers handed over to the host
//! - [`error`]: errno results, host errors and exceptions

pub mod buffer;
pub mod error;
pub mod function;
pub mod object;
pub mod promise;
pub mod value;

pub use crate::runtime::Env;
pub use buffer::ArrayBuffer;
pub use error::{ERRNO_NOERR, ErrorResult, Exception, HostError, HostResult};
pub use function::{CallbackInfo, Function};
pub use object::{Object, PropertyDescriptor};
pub use promise::{Deferred, Promise, PromiseState};
pub use value::{Value, ValueType};
