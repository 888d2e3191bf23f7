//! [`Scheduler`] backed by Tokio tasks and timers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{OnceTask, RepeatingTask, Scheduler, TimerId};

type TimerTable = Arc<Mutex<HashMap<TimerId, AbortHandle>>>;

fn lock(timers: &TimerTable) -> MutexGuard<'_, HashMap<TimerId, AbortHandle>> {
    timers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Spawns one Tokio task per timer. Must be used inside a Tokio runtime.
#[derive(Default)]
pub struct TokioScheduler {
    next_id: AtomicU64,
    timers: TimerTable,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&self) -> TimerId {
        TimerId::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        lock(&self.timers).len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerId {
        let id = self.next_id();
        let timers = Arc::clone(&self.timers);

        // Hold the table while spawning so the task cannot remove its
        // entry before it is inserted.
        let mut table = lock(&self.timers);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            lock(&timers).remove(&id);
            task(id);
        });
        table.insert(id, handle.abort_handle());
        id
    }

    fn schedule_repeating(&self, period: Duration, mut task: RepeatingTask) -> TimerId {
        let id = self.next_id();
        let mut table = lock(&self.timers);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                task(id);
            }
        });
        table.insert(id, handle.abort_handle());
        id
    }

    fn cancel(&self, id: TimerId) {
        if let Some(handle) = lock(&self.timers).remove(&id) {
            handle.abort();
        }
    }
}

impl Drop for TokioScheduler {
    /// Timers never outlive their scheduler.
    fn drop(&mut self) {
        for (_, handle) in lock(&self.timers).drain() {
            handle.abort();
        }
    }
}
