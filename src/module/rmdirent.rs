//! `rmdirSync(path)` and `rmdir(path, callback?)`.

use crate::async_work::AsyncWork;
use crate::error::FileIoError;
use crate::fs::remove_tree;
use crate::host::{CallbackInfo, ErrorResult, HostResult, Value};
use crate::runtime::Env;

use std::path::PathBuf;

/// Name the asynchronous removal is scheduled under.
pub const PROCEDURE_NAME: &str = "FileIORmdirent";

/// Removes a directory tree on the loop thread, throwing on failure.
pub fn rmdir_sync(env: &Env, info: &CallbackInfo) -> HostResult<Value> {
    info.init_args(1, 1).map_err(|err| err.throw(env))?;
    let path = path_arg(info, 0).map_err(|err| err.throw(env))?;

    let result = remove_tree(&path);
    if result.is_err() {
        return Err(result.throw(env, None));
    }

    Ok(Value::Undefined)
}

/// Removes a directory tree on a worker thread.
///
/// Returns a promise when called with a path only. With a callback, returns
/// `undefined` and later calls `callback(err)` or `callback(null, undefined)`.
pub fn rmdir(env: &Env, info: &CallbackInfo) -> HostResult<Value> {
    info.init_args(1, 2).map_err(|err| err.throw(env))?;
    let path = path_arg(info, 0).map_err(|err| err.throw(env))?;

    let callback = match info.arg(1) {
        Value::Undefined => None,
        Value::Function(callback) => Some(callback),
        _ => return Err(FileIoError::InvalidArgument("callback").throw(env)),
    };

    let execute = move || remove_tree(&path);
    let complete = |env: &Env, err: ErrorResult| {
        if err.is_err() {
            err.to_host_error(env)
        } else {
            Value::Undefined
        }
    };

    AsyncWork::new(env, info.this().clone(), callback)
        .schedule(PROCEDURE_NAME, execute, complete)
        .map_err(|err| err.throw(env))
}

fn path_arg(info: &CallbackInfo, index: usize) -> Result<PathBuf, FileIoError> {
    info.arg(index)
        .to_utf8_string()
        .map(PathBuf::from)
        .ok_or(FileIoError::InvalidPath)
}
