//! Blocking filesystem primitives run by execute steps.
//!
//! Public API:
//! - [`DirStream`]: `opendir`/`readdir` wrapper yielding entry names
//! - [`entry_kind`], [`remove_dir`], [`unlink`]: single-entry operations
//! - [`remove_tree`]: recursive, failure-tolerant directory removal

pub mod dir;
pub mod rmdirent;

pub use dir::{DirStream, EntryKind, entry_kind, remove_dir, unlink};
pub use rmdirent::remove_tree;
