//! Error values that cross the worker/loop boundary and their host form.
//!
//! [`ErrorResult`] is plain data (`Copy + Send`) and is what execute steps return.
//! It only becomes a host object ([`HostError`]) inside a completion step, on the
//! loop thread.

use crate::host::Value;
use crate::runtime::{Env, is_loop_thread};

use std::ffi::CStr;
use std::fmt;
use std::io;
use std::rc::Rc;

/// Errno value used to represent "no error".
pub const ERRNO_NOERR: i32 = 0;

/// Outcome of a blocking step: either [`ErrorResult::OK`] or a platform error number.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorResult {
    code: i32,
}

impl ErrorResult {
    /// The "no error" sentinel.
    pub const OK: ErrorResult = ErrorResult { code: ERRNO_NOERR };

    /// Wraps a platform error number. Zero yields [`ErrorResult::OK`].
    pub const fn from_errno(code: i32) -> Self {
        Self { code }
    }

    /// Captures the calling thread's current errno.
    ///
    /// Falls back to `EIO` when errno is unset, so a failure is never reported as success.
    pub fn last_os_error() -> Self {
        match io::Error::last_os_error().raw_os_error() {
            Some(code) if code != ERRNO_NOERR => Self { code },
            _ => Self { code: libc::EIO },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.code == ERRNO_NOERR
    }

    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }

    /// Raw platform error number, `0` for success.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Symbolic errno name such as `"ENOENT"`.
    pub fn name(&self) -> &'static str {
        errno_name(self.code)
    }

    /// Human readable description of the error number.
    pub fn message(&self) -> String {
        if self.is_ok() {
            return "Success".to_string();
        }

        // strerror hands back a pointer into static storage for known codes.
        let text = unsafe { libc::strerror(self.code) };
        if text.is_null() {
            return format!("Unknown error {}", self.code);
        }

        unsafe { CStr::from_ptr(text) }
            .to_string_lossy()
            .into_owned()
    }

    /// Builds the host representation: an error value, or `Null` for success.
    pub fn to_host_error(&self, _env: &Env) -> Value {
        debug_assert!(is_loop_thread(), "host errors are created on the loop thread");

        if self.is_ok() {
            return Value::Null;
        }

        Value::Error(HostError::from_errno(self.code, None))
    }

    /// Builds a throwable exception, optionally replacing the default message.
    pub fn throw(&self, _env: &Env, message: Option<&str>) -> Exception {
        debug_assert!(is_loop_thread(), "exceptions are thrown on the loop thread");

        let code = if self.is_ok() { libc::EIO } else { self.code };
        Exception::new(Value::Error(HostError::from_errno(code, message)))
    }
}

impl Default for ErrorResult {
    fn default() -> Self {
        Self::OK
    }
}

impl fmt::Debug for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("ErrorResult::OK");
        }

        write!(f, "ErrorResult({}: {})", self.name(), self.code)
    }
}

impl fmt::Display for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message())
    }
}

impl From<io::Error> for ErrorResult {
    fn from(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) if code != ERRNO_NOERR => Self { code },
            _ => Self { code: libc::EIO },
        }
    }
}

fn errno_name(code: i32) -> &'static str {
    match code {
        ERRNO_NOERR => "OK",
        libc::EPERM => "EPERM",
        libc::ENOENT => "ENOENT",
        libc::EIO => "EIO",
        libc::EBADF => "EBADF",
        libc::EAGAIN => "EAGAIN",
        libc::ENOMEM => "ENOMEM",
        libc::EACCES => "EACCES",
        libc::EBUSY => "EBUSY",
        libc::EEXIST => "EEXIST",
        libc::EXDEV => "EXDEV",
        libc::ENOTDIR => "ENOTDIR",
        libc::EISDIR => "EISDIR",
        libc::EINVAL => "EINVAL",
        libc::EMFILE => "EMFILE",
        libc::ENFILE => "ENFILE",
        libc::ENOSPC => "ENOSPC",
        libc::EROFS => "EROFS",
        libc::EMLINK => "EMLINK",
        libc::ENAMETOOLONG => "ENAMETOOLONG",
        libc::ENOTEMPTY => "ENOTEMPTY",
        libc::ELOOP => "ELOOP",
        libc::ECANCELED => "ECANCELED",
        _ => "UNKNOWN",
    }
}

/// Host-visible error object.
///
/// Carries the message shown to scripts plus the errno it was created from, if any.
#[derive(Clone)]
pub struct HostError {
    inner: Rc<HostErrorInner>,
}

struct HostErrorInner {
    message: String,
    code: Option<i32>,
}

impl HostError {
    /// Creates an error without an errno.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(HostErrorInner {
                message: message.into(),
                code: None,
            }),
        }
    }

    /// Creates an error for a platform error number.
    ///
    /// Uses the strerror text unless `message` overrides it.
    pub fn from_errno(code: i32, message: Option<&str>) -> Self {
        let message = match message {
            Some(text) => text.to_string(),
            None => ErrorResult::from_errno(code).message(),
        };

        Self {
            inner: Rc::new(HostErrorInner {
                message,
                code: Some(code),
            }),
        }
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    pub fn code(&self) -> Option<i32> {
        self.inner.code
    }

    /// Symbolic errno name, when the error carries a code.
    pub fn name(&self) -> Option<&'static str> {
        self.inner.code.map(errno_name)
    }

    pub fn ptr_eq(&self, other: &HostError) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostError")
            .field("message", &self.inner.message)
            .field("code", &self.inner.code)
            .finish()
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}: {}", name, self.inner.message),
            None => f.write_str(&self.inner.message),
        }
    }
}

/// A thrown host value.
#[derive(Clone, Debug)]
pub struct Exception {
    value: Value,
}

impl Exception {
    pub fn new(value: Value) -> Self {
        Self { value }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    /// The thrown value as an error object, if it is one.
    pub fn as_error(&self) -> Option<&HostError> {
        self.value.as_error()
    }
}

impl From<HostError> for Exception {
    fn from(err: HostError) -> Self {
        Self::new(Value::Error(err))
    }
}

/// Result of a host-facing operation: a value, or a thrown exception.
pub type HostResult<T = Value> = Result<T, Exception>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_success() {
        assert!(ErrorResult::OK.is_ok());
        assert!(ErrorResult::from_errno(0).is_ok());
        assert!(ErrorResult::default().is_ok());
        assert_eq!(ErrorResult::OK.code(), ERRNO_NOERR);
    }

    #[test]
    fn errno_keeps_code_and_name() {
        let err = ErrorResult::from_errno(libc::ENOENT);
        assert!(err.is_err());
        assert_eq!(err.code(), libc::ENOENT);
        assert_eq!(err.name(), "ENOENT");
        assert!(
            err.message()
                .to_lowercase()
                .contains("no such file or directory")
        );
    }

    #[test]
    fn io_error_without_code_becomes_eio() {
        let err = ErrorResult::from(io::Error::other("opaque"));
        assert_eq!(err.code(), libc::EIO);

        let err = ErrorResult::from(io::Error::from_raw_os_error(libc::EACCES));
        assert_eq!(err.code(), libc::EACCES);
    }

    #[test]
    fn host_error_message_override() {
        let err = HostError::from_errno(libc::EINVAL, Some("Invalid path"));
        assert_eq!(err.message(), "Invalid path");
        assert_eq!(err.code(), Some(libc::EINVAL));
        assert_eq!(err.name(), Some("EINVAL"));
        assert_eq!(err.to_string(), "EINVAL: Invalid path");

        let plain = HostError::new("boom");
        assert_eq!(plain.code(), None);
        assert_eq!(plain.to_string(), "boom");
    }
}
