//! Lifecycle tracking for a scheduled work item.

use std::sync::atomic::{AtomicU8, Ordering};

use tracing::trace;

/// Lifecycle stage of a work item.
///
/// Stages only move forward: `Created → Scheduled → Executing → Completing → Released`.
/// An item whose submission failed stays `Created`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum WorkState {
    Created = 0,
    Scheduled = 1,
    Executing = 2,
    Completing = 3,
    Released = 4,
}

impl WorkState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => WorkState::Created,
            1 => WorkState::Scheduled,
            2 => WorkState::Executing,
            3 => WorkState::Completing,
            _ => WorkState::Released,
        }
    }
}

/// Shared between the worker and the loop side of one work item.
#[derive(Debug)]
pub(crate) struct WorkStatus {
    name: String,
    state: AtomicU8,
}

impl WorkStatus {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: AtomicU8::new(WorkState::Created as u8),
        }
    }

    pub(crate) fn current(&self) -> WorkState {
        WorkState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Moves to `next` unless the item is already past it.
    ///
    /// The worker may reach `Executing` before the loop thread records
    /// `Scheduled`; the later, smaller transition is then a no-op.
    pub(crate) fn advance(&self, next: WorkState) -> WorkState {
        let previous = WorkState::from_u8(self.state.fetch_max(next as u8, Ordering::AcqRel));

        if previous < next {
            trace!(work = %self.name, from = ?previous, to = ?next, "work state changed");
        }

        previous
    }
}
