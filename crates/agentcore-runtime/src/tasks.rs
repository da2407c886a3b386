//! In-flight work accounting.
//!
//! The health service reports `HealthyBusy` while this counter is non-zero.
//! Decrements are clamped at zero so unbalanced completion callbacks can never
//! drive the count negative.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide count of units of work that are still running.
#[derive(Debug, Default)]
pub struct TaskCounter {
    active: AtomicU64,
}

impl TaskCounter {
    /// Creates a counter at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            active: AtomicU64::new(0),
        }
    }

    /// Records the start of a unit of work.
    pub fn increment(&self) {
        self.active.fetch_add(1, Ordering::AcqRel);
    }

    /// Records the end of a unit of work; a no-op when nothing is running.
    pub fn decrement(&self) {
        let _ = self
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_sub(1)
            });
    }

    /// Number of units of work currently running.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.active.load(Ordering::Acquire)
    }

    /// Increments the counter and returns a guard that decrements it on drop,
    /// whether the tracked work succeeds, fails, or is cancelled.
    #[must_use = "dropping the guard immediately ends the tracked task"]
    pub fn track(self: &Arc<Self>) -> TaskGuard {
        self.increment();
        TaskGuard {
            counter: Arc::clone(self),
        }
    }
}

/// Keeps one unit of work registered with a [`TaskCounter`].
#[derive(Debug)]
pub struct TaskGuard {
    counter: Arc<TaskCounter>,
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.counter.decrement();
    }
}
