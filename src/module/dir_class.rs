//! `opendirSync(path)` and the `Dir` objects it returns.
//!
//! A `Dir` wraps an open [`DirStream`]:
//! - `readSync()` returns the next `Dirent`, or `null` at the end
//! - `closeSync()` releases the stream; later calls throw `EBADF`
//!
//! A `Dirent` exposes `name` plus `isDirectory()`, `isFile()` and
//! `isSymbolicLink()`, answered from an `lstat` taken when the entry was read.

use crate::error::FileIoError;
use crate::fs::{DirStream, EntryKind, entry_kind};
use crate::host::{
    CallbackInfo, ErrorResult, Function, HostResult, Object, PropertyDescriptor, Value,
};
use crate::runtime::Env;

use std::path::PathBuf;

/// Class name the directory exporter registers under.
pub const CLASS_NAME: &str = "Dir";

/// Native state of a `Dir` object. `None` once closed.
struct DirHandle {
    stream: Option<DirStream>,
}

/// Native state of a `Dirent` object.
struct DirentInfo {
    kind: Option<EntryKind>,
}

/// Opens a directory and returns a `Dir` object for it.
pub fn opendir_sync(env: &Env, info: &CallbackInfo) -> HostResult<Value> {
    info.init_args(1, 1).map_err(|err| err.throw(env))?;
    let path = info
        .arg(0)
        .to_utf8_string()
        .map(PathBuf::from)
        .ok_or(FileIoError::InvalidPath)
        .map_err(|err| err.throw(env))?;

    let stream = DirStream::open(&path).map_err(|err| err.throw(env, None))?;

    let dir = Object::new();
    let handle = DirHandle {
        stream: Some(stream),
    };
    if !dir.wrap(handle) {
        return Err(FileIoError::Export {
            class: CLASS_NAME.to_string(),
        }
        .throw(env));
    }
    dir.define_properties(vec![
        PropertyDescriptor::function("readSync", Function::new("readSync", read_sync)),
        PropertyDescriptor::function("closeSync", Function::new("closeSync", close_sync)),
    ]);

    Ok(Value::Object(dir))
}

fn read_sync(env: &Env, info: &CallbackInfo) -> HostResult<Value> {
    info.init_args(0, 0).map_err(|err| err.throw(env))?;
    let dir = this_object(env, info)?;

    let next = dir
        .with_native(|handle: &mut DirHandle| -> Result<_, ErrorResult> {
            let stream = handle
                .stream
                .as_mut()
                .ok_or(ErrorResult::from_errno(libc::EBADF))?;

            Ok(stream
                .next_entry()
                .map(|entry| entry.map(|name| (stream.path().join(&name), name))))
        })
        .ok_or_else(|| FileIoError::InvalidArgument("Dir").throw(env))?
        .map_err(|err: ErrorResult| err.throw(env, None))?;

    match next {
        None => Ok(Value::Null),
        Some(Err(err)) => Err(err.throw(env, None)),
        Some(Ok((full_path, name))) => {
            let kind = entry_kind(&full_path).ok();
            create_dirent(&name.to_string_lossy(), kind)
                .map(Value::Object)
                .map_err(|err| err.throw(env))
        }
    }
}

fn close_sync(env: &Env, info: &CallbackInfo) -> HostResult<Value> {
    info.init_args(0, 0).map_err(|err| err.throw(env))?;
    let dir = this_object(env, info)?;

    let closed = dir
        .with_native(|handle: &mut DirHandle| handle.stream.take().is_some())
        .ok_or_else(|| FileIoError::InvalidArgument("Dir").throw(env))?;

    if !closed {
        return Err(ErrorResult::from_errno(libc::EBADF).throw(env, None));
    }

    Ok(Value::Undefined)
}

fn create_dirent(name: &str, kind: Option<EntryKind>) -> Result<Object, FileIoError> {
    let dirent = Object::new();
    if !dirent.wrap(DirentInfo { kind }) {
        return Err(FileIoError::Export {
            class: "Dirent".to_string(),
        });
    }
    dirent.define_properties(vec![
        PropertyDescriptor::value("name", Value::string(name)),
        PropertyDescriptor::function("isDirectory", kind_check("isDirectory", EntryKind::Directory)),
        PropertyDescriptor::function("isFile", kind_check("isFile", EntryKind::File)),
        PropertyDescriptor::function("isSymbolicLink", kind_check("isSymbolicLink", EntryKind::Symlink)),
    ]);

    Ok(dirent)
}

fn kind_check(name: &str, expected: EntryKind) -> Function {
    Function::new(name, move |env, info| {
        let dirent = this_object(env, info)?;
        let kind = dirent
            .with_native(|state: &mut DirentInfo| state.kind)
            .ok_or_else(|| FileIoError::InvalidArgument("Dirent").throw(env))?;

        Ok(Value::Bool(kind == Some(expected)))
    })
}

fn this_object(env: &Env, info: &CallbackInfo) -> HostResult<Object> {
    info.this()
        .as_object()
        .cloned()
        .ok_or_else(|| FileIoError::InvalidArgument("receiver").throw(env))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dirent_carries_its_kind() {
        let dirent = create_dirent("entry", Some(EntryKind::File)).unwrap();

        assert_eq!(
            dirent.get_prop("name").and_then(|v| v.to_utf8_string()),
            Some("entry".to_string())
        );
        assert_eq!(
            dirent.with_native(|state: &mut DirentInfo| state.kind),
            Some(Some(EntryKind::File))
        );
        assert!(!dirent.wrap(DirentInfo { kind: None }), "A second wrap must be refused");
    }
}
