//! Thin libc wrappers for directory streams and single-entry operations.
//!
//! Every function reports failure as an [`ErrorResult`] carrying the errno of
//! the failing call, ready to cross a thread boundary.
//!
//! # Examples
//!
//! List the entries of a directory:
//!
//! ```no_run
//! use fileio::fs::DirStream;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), fileio::ErrorResult> {
//! for entry in DirStream::open(Path::new("/tmp"))? {
//!     println!("{:?}", entry?);
//! }
//! # Ok(())
//! # }
//! ```

use crate::host::ErrorResult;

use std::ffi::{CStr, CString, OsStr, OsString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// File type of a directory entry, as reported by `lstat`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Symlink,
    Other,
}

/// An open directory stream.
///
/// Yields entry names without the `.` and `..` pseudo-entries. The stream is
/// closed when dropped.
pub struct DirStream {
    handle: NonNull<libc::DIR>,
    path: PathBuf,
    finished: bool,
}

// The DIR handle is owned exclusively by this value and only used through &mut self.
unsafe impl Send for DirStream {}

impl DirStream {
    /// Opens `path` for listing.
    pub fn open(path: &Path) -> Result<Self, ErrorResult> {
        let c_path = c_path(path)?;

        let handle = unsafe { libc::opendir(c_path.as_ptr()) };
        let handle = NonNull::new(handle).ok_or_else(ErrorResult::last_os_error)?;

        Ok(Self {
            handle,
            path: path.to_path_buf(),
            finished: false,
        })
    }

    /// Opens `path` for listing without following a symlink in its last component.
    ///
    /// A symlink fails with `ELOOP` or `ENOTDIR` instead of listing its target.
    pub fn open_no_follow(path: &Path) -> Result<Self, ErrorResult> {
        let c_path = c_path(path)?;
        let flags = libc::O_RDONLY | libc::O_DIRECTORY | libc::O_NOFOLLOW | libc::O_CLOEXEC;

        let fd = unsafe { libc::open(c_path.as_ptr(), flags) };
        if fd < 0 {
            return Err(ErrorResult::last_os_error());
        }

        let handle = unsafe { libc::fdopendir(fd) };
        let handle = match NonNull::new(handle) {
            Some(handle) => handle,
            None => {
                let err = ErrorResult::last_os_error();
                unsafe { libc::close(fd) };
                return Err(err);
            }
        };

        Ok(Self {
            handle,
            path: path.to_path_buf(),
            finished: false,
        })
    }

    /// Path the stream was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the next entry name.
    ///
    /// Returns `None` at the end of the listing. A read error is returned once,
    /// after which the stream reports the end.
    pub fn next_entry(&mut self) -> Option<Result<OsString, ErrorResult>> {
        while !self.finished {
            // readdir only signals errors through errno, so clear it first.
            clear_errno();
            let entry = unsafe { libc::readdir(self.handle.as_ptr()) };

            if entry.is_null() {
                self.finished = true;
                let code = std::io::Error::last_os_error()
                    .raw_os_error()
                    .unwrap_or(0);

                if code == 0 {
                    return None;
                }

                return Some(Err(ErrorResult::from_errno(code)));
            }

            let name = unsafe { CStr::from_ptr((*entry).d_name.as_ptr()) }.to_bytes();
            if name.is_empty() || name == b"." || name == b".." {
                continue;
            }

            return Some(Ok(OsStr::from_bytes(name).to_os_string()));
        }

        None
    }
}

impl Iterator for DirStream {
    type Item = Result<OsString, ErrorResult>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry()
    }
}

impl Drop for DirStream {
    fn drop(&mut self) {
        unsafe {
            libc::closedir(self.handle.as_ptr());
        }
    }
}

/// Classifies `path` without following a trailing symlink.
pub fn entry_kind(path: &Path) -> Result<EntryKind, ErrorResult> {
    let c_path = c_path(path)?;
    let mut info: libc::stat = unsafe { std::mem::zeroed() };

    if unsafe { libc::lstat(c_path.as_ptr(), &mut info) } != 0 {
        return Err(ErrorResult::last_os_error());
    }

    let kind = match info.st_mode & libc::S_IFMT {
        libc::S_IFDIR => EntryKind::Directory,
        libc::S_IFREG => EntryKind::File,
        libc::S_IFLNK => EntryKind::Symlink,
        _ => EntryKind::Other,
    };

    Ok(kind)
}

/// Removes an empty directory.
pub fn remove_dir(path: &Path) -> Result<(), ErrorResult> {
    let c_path = c_path(path)?;

    if unsafe { libc::rmdir(c_path.as_ptr()) } != 0 {
        return Err(ErrorResult::last_os_error());
    }

    Ok(())
}

/// Removes a non-directory entry.
pub fn unlink(path: &Path) -> Result<(), ErrorResult> {
    let c_path = c_path(path)?;

    if unsafe { libc::unlink(c_path.as_ptr()) } != 0 {
        return Err(ErrorResult::last_os_error());
    }

    Ok(())
}

fn c_path(path: &Path) -> Result<CString, ErrorResult> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| ErrorResult::from_errno(libc::EINVAL))
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn clear_errno() {
    unsafe { *libc::__errno_location() = 0 }
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
fn clear_errno() {
    unsafe { *libc::__error() = 0 }
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd"
)))]
fn clear_errno() {}
