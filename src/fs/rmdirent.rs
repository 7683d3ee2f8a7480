//! Recursive directory removal that keeps going past individual failures.
//!
//! The walk first tries to remove the directory as if it were empty. Only when
//! that fails is it listed; every child is then removed (directories through the
//! same procedure, everything else with `unlink`) and the directory is removed
//! once more. A child that cannot be removed is remembered but does not stop
//! the removal of its siblings.
//!
//! Open directories are kept on an explicit stack, one frame per level, so deep
//! trees do not grow the native call stack.
//!
//! # Reported error
//!
//! - success when the final removal of the root succeeds
//! - otherwise the most recent child failure at the root level (a failing
//!   subdirectory reports its own most recent failure the same way)
//! - otherwise the error of the final removal attempt
//!
//! Symbolic links are never followed: a link to a directory is unlinked and its
//! target left untouched. A link passed as the root is refused with `ENOTDIR`.

use crate::fs::dir::{DirStream, EntryKind, entry_kind, remove_dir, unlink};
use crate::host::ErrorResult;

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

/// Removes `path` and everything below it.
///
/// # Arguments
/// * `path` - Directory to remove. A symlink is refused with `ENOTDIR`, its
///   target is not touched
///
/// # Returns
/// [`ErrorResult::OK`] when the tree is gone, otherwise the error chosen as
/// described in the module documentation
pub fn remove_tree(path: impl AsRef<Path>) -> ErrorResult {
    let path = path.as_ref();

    if remove_dir(path).is_ok() {
        return ErrorResult::OK;
    }

    let root = match open_directory(path) {
        Ok(stream) => stream,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "cannot open directory for removal");
            return err;
        }
    };

    let mut stack = vec![Frame::new(path.to_path_buf(), root)];

    while let Some(frame) = stack.last_mut() {
        match frame.stream.next_entry() {
            Some(Ok(name)) => {
                let child = frame.path.join(name);
                match remove_entry(&child) {
                    Ok(None) => {}
                    Ok(Some(stream)) => stack.push(Frame::new(child, stream)),
                    Err(err) => {
                        debug!(path = %child.display(), error = %err, "failed to remove entry");
                        frame.record(err);
                    }
                }
            }
            Some(Err(err)) => {
                debug!(path = %frame.path.display(), error = %err, "directory listing failed");
                frame.record(err);
            }
            None => {
                let outcome = stack.pop().map(Frame::finish).unwrap_or(ErrorResult::OK);

                match stack.last_mut() {
                    Some(parent) => parent.record(outcome),
                    None => return outcome,
                }
            }
        }
    }

    ErrorResult::OK
}

/// Removes one child entry, or opens it when it is a non-empty directory.
fn remove_entry(path: &Path) -> Result<Option<DirStream>, ErrorResult> {
    match entry_kind(path)? {
        EntryKind::Directory => {
            if remove_dir(path).is_ok() {
                return Ok(None);
            }

            DirStream::open_no_follow(path).map(Some)
        }
        _ => unlink(path).map(|()| None),
    }
}

/// Opens the root for listing, refusing anything but a real directory.
fn open_directory(path: &Path) -> Result<DirStream, ErrorResult> {
    match entry_kind(path)? {
        EntryKind::Directory => DirStream::open_no_follow(path),
        _ => Err(ErrorResult::from_errno(libc::ENOTDIR)),
    }
}

/// One directory level being emptied.
struct Frame {
    path: PathBuf,
    stream: DirStream,
    last_failure: ErrorResult,
}

impl Frame {
    fn new(path: PathBuf, stream: DirStream) -> Self {
        trace!(path = %path.display(), "descending into directory");

        Self {
            path,
            stream,
            last_failure: ErrorResult::OK,
        }
    }

    fn record(&mut self, outcome: ErrorResult) {
        if outcome.is_err() {
            self.last_failure = outcome;
        }
    }

    /// Closes the listing and retries removing the directory itself.
    fn finish(self) -> ErrorResult {
        let Frame {
            path,
            stream,
            last_failure,
        } = self;
        drop(stream);

        match remove_dir(&path) {
            Ok(()) => ErrorResult::OK,
            Err(_) if last_failure.is_err() => last_failure,
            Err(retry) => retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn empty_directory() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("empty");
        fs::create_dir(&target).unwrap();

        assert_eq!(remove_tree(&target), ErrorResult::OK);
        assert!(!target.exists());
    }

    #[test]
    fn missing_directory_is_enoent() {
        let temp = tempfile::tempdir().unwrap();
        let err = remove_tree(temp.path().join("missing"));
        assert_eq!(err.code(), libc::ENOENT);
    }

    #[test]
    fn regular_file_is_enotdir() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("file");
        fs::write(&file, b"data").unwrap();

        assert_eq!(remove_tree(&file).code(), libc::ENOTDIR);
        assert!(file.exists());
    }

    #[test]
    fn nested_tree() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("root");
        fs::create_dir_all(root.join("a/b/c")).unwrap();
        fs::create_dir_all(root.join("d")).unwrap();
        fs::write(root.join("top.txt"), b"1").unwrap();
        fs::write(root.join("a/mid.txt"), b"2").unwrap();
        fs::write(root.join("a/b/c/deep.txt"), b"3").unwrap();

        assert_eq!(remove_tree(&root), ErrorResult::OK);
        assert!(!root.exists());
    }

    #[test]
    fn symlink_to_directory_is_unlinked_not_followed() {
        let temp = tempfile::tempdir().unwrap();
        let keep = temp.path().join("keep");
        let root = temp.path().join("root");
        fs::create_dir(&keep).unwrap();
        fs::write(keep.join("precious"), b"x").unwrap();
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(&keep, root.join("link")).unwrap();

        assert_eq!(remove_tree(&root), ErrorResult::OK);
        assert!(!root.exists());
        assert!(keep.join("precious").exists());
    }

    #[test]
    fn symlink_root_is_refused() {
        let temp = tempfile::tempdir().unwrap();
        let target = temp.path().join("target");
        let link = temp.path().join("link");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("precious"), b"x").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert_eq!(remove_tree(&link).code(), libc::ENOTDIR);
        assert!(fs::symlink_metadata(&link).is_ok(), "Link should be left in place");
        assert!(target.join("precious").exists(), "Target contents must survive");
    }
}
