//! Cancellable delayed and periodic callbacks.
//!
//! Reconnect backoff and heartbeats go through [`Scheduler`] so tests can
//! drive time by hand instead of sleeping.

mod tokio_scheduler;

use std::fmt;
use std::time::Duration;

pub use tokio_scheduler::TokioScheduler;

/// Opaque token identifying one scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// One-shot task; receives its own id when it fires.
pub type OnceTask = Box<dyn FnOnce(TimerId) + Send + 'static>;

/// Periodic task; receives its own id on every tick.
pub type RepeatingTask = Box<dyn FnMut(TimerId) + Send + 'static>;

/// Timer facility used by the client.
///
/// Tasks must never run synchronously inside `schedule_*` or `cancel`;
/// the client calls these while holding its channel lock.
pub trait Scheduler: Send + Sync {
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerId;

    /// The first tick fires one `period` after scheduling.
    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TimerId;

    /// Cancel a task. Unknown or already-fired ids are ignored.
    fn cancel(&self, id: TimerId);
}
