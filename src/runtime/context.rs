//! Thread-local loop-thread marker.
//!
//! [`Runtime::run`](crate::Runtime::run) enters the loop context on the calling
//! thread. Completion steps and host error construction assert that they run
//! inside it; worker threads never enter it.

use std::cell::Cell;

thread_local! {
    /// Nesting depth of loop contexts on this thread.
    static LOOP_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Returns `true` while the current thread is running a [`Runtime`](crate::Runtime) loop.
pub fn is_loop_thread() -> bool {
    LOOP_DEPTH.with(|depth| depth.get() > 0)
}

/// Runs `function` with the current thread marked as the loop thread.
///
/// The previous marker is restored on exit, including when `function` panics.
pub(crate) fn enter_context<F, R>(function: F) -> R
where
    F: FnOnce() -> R,
{
    struct Exit;

    impl Drop for Exit {
        fn drop(&mut self) {
            LOOP_DEPTH.with(|depth| depth.set(depth.get() - 1));
        }
    }

    LOOP_DEPTH.with(|depth| depth.set(depth.get() + 1));
    let _exit = Exit;

    function()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_scoped() {
        assert!(!is_loop_thread());

        enter_context(|| {
            assert!(is_loop_thread());
            enter_context(|| assert!(is_loop_thread()));
            assert!(is_loop_thread());
        });

        assert!(!is_loop_thread());
    }

    #[test]
    fn marker_is_per_thread() {
        enter_context(|| {
            let other = std::thread::spawn(is_loop_thread).join().unwrap();
            assert!(!other);
        });
    }
}
