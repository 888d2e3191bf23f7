//! Deterministic doubles for the scheduler and transport seams.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use livewire_common::TransportError;

use crate::scheduler::{OnceTask, RepeatingTask, Scheduler, TimerId};
use crate::transport::{
    EventSink, ReadyState, Transport, TransportEvent, TransportFactory, ABNORMAL_CLOSURE,
};

/// Yield to the runtime until `condition` holds.
pub(crate) async fn settle_until<F>(condition: F)
where
    F: Fn() -> bool,
{
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached after 200 yields");
}

// ---------------------------------------------------------------------------
// ManualScheduler
// ---------------------------------------------------------------------------

enum Task {
    Once(OnceTask),
    Repeating { period: Duration, task: RepeatingTask },
}

struct Timer {
    due: Duration,
    task: Task,
}

#[derive(Default)]
struct ClockState {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerId, Timer>,
    running: Option<TimerId>,
    running_cancelled: bool,
    once_delays: Vec<Duration>,
}

/// Scheduler on a virtual clock that only moves in [`ManualScheduler::advance`].
#[derive(Default)]
pub(crate) struct ManualScheduler {
    state: Mutex<ClockState>,
}

impl ManualScheduler {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Move the clock forward, running every task that falls due in order.
    pub(crate) fn advance(&self, by: Duration) {
        let target = self.state.lock().unwrap().now + by;
        loop {
            let (id, timer) = {
                let mut state = self.state.lock().unwrap();
                let next = state
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.due <= target)
                    .min_by_key(|(id, timer)| (timer.due, **id))
                    .map(|(id, _)| *id);
                let Some(id) = next else {
                    state.now = target;
                    return;
                };
                let timer = state.timers.remove(&id).unwrap();
                state.now = timer.due;
                state.running = Some(id);
                state.running_cancelled = false;
                (id, timer)
            };

            match timer.task {
                Task::Once(task) => {
                    task(id);
                    self.state.lock().unwrap().running = None;
                }
                Task::Repeating { period, mut task } => {
                    task(id);
                    let mut state = self.state.lock().unwrap();
                    state.running = None;
                    if !state.running_cancelled {
                        state.timers.insert(
                            id,
                            Timer {
                                due: timer.due + period,
                                task: Task::Repeating { period, task },
                            },
                        );
                    }
                }
            }
        }
    }

    pub(crate) fn pending(&self) -> usize {
        self.state.lock().unwrap().timers.len()
    }

    /// Pending one-shot timers.
    pub(crate) fn pending_once(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .timers
            .values()
            .filter(|timer| matches!(timer.task, Task::Once(_)))
            .count()
    }

    /// Delays of every one-shot timer ever scheduled, in order.
    pub(crate) fn once_delays(&self) -> Vec<Duration> {
        self.state.lock().unwrap().once_delays.clone()
    }

    fn insert(&self, delay: Duration, task: Task) -> TimerId {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = TimerId::new(state.next_id);
        if matches!(task, Task::Once(_)) {
            state.once_delays.push(delay);
        }
        let due = state.now + delay;
        state.timers.insert(id, Timer { due, task });
        id
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&self, delay: Duration, task: OnceTask) -> TimerId {
        self.insert(delay, Task::Once(task))
    }

    fn schedule_repeating(&self, period: Duration, task: RepeatingTask) -> TimerId {
        self.insert(period, Task::Repeating { period, task })
    }

    fn cancel(&self, id: TimerId) {
        let mut state = self.state.lock().unwrap();
        if state.timers.remove(&id).is_none() && state.running == Some(id) {
            state.running_cancelled = true;
        }
    }
}

// ---------------------------------------------------------------------------
// FakeTransport
// ---------------------------------------------------------------------------

/// Transport whose lifecycle is driven by the test.
pub(crate) struct FakeTransport {
    pub(crate) target: String,
    events: EventSink,
    state: Mutex<ReadyState>,
    sent: Mutex<Vec<String>>,
    close_calls: Mutex<Vec<(u16, String)>>,
}

impl FakeTransport {
    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub(crate) fn close_calls(&self) -> Vec<(u16, String)> {
        self.close_calls.lock().unwrap().clone()
    }

    /// Complete the handshake.
    pub(crate) fn accept(&self) {
        *self.state.lock().unwrap() = ReadyState::Open;
        self.events.emit(TransportEvent::Opened);
    }

    pub(crate) fn deliver(&self, text: &str) {
        self.events.emit(TransportEvent::Message(text.to_string()));
    }

    /// Close from the remote side.
    pub(crate) fn drop_with(&self, code: u16, reason: &str) {
        *self.state.lock().unwrap() = ReadyState::Closed;
        self.events.emit(TransportEvent::Closed {
            code,
            reason: reason.to_string(),
        });
    }

    /// Fail without a close frame.
    pub(crate) fn fail(&self) {
        self.events
            .emit(TransportEvent::Error("connection reset".to_string()));
        self.drop_with(ABNORMAL_CLOSURE, "");
    }
}

impl Transport for FakeTransport {
    fn ready_state(&self) -> ReadyState {
        *self.state.lock().unwrap()
    }

    fn send(&self, frame: String) -> Result<(), TransportError> {
        if self.ready_state() != ReadyState::Open {
            return Err(TransportError::NotOpen);
        }
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    fn close(&self, code: u16, reason: &str) {
        self.close_calls
            .lock()
            .unwrap()
            .push((code, reason.to_string()));
        let mut state = self.state.lock().unwrap();
        if *state != ReadyState::Closed {
            *state = ReadyState::Closing;
        }
    }
}

/// Records every transport it opens.
#[derive(Default)]
pub(crate) struct FakeTransportFactory {
    opened: Mutex<Vec<Arc<FakeTransport>>>,
}

impl FakeTransportFactory {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn opened(&self) -> Vec<Arc<FakeTransport>> {
        self.opened.lock().unwrap().clone()
    }

    pub(crate) fn count(&self) -> usize {
        self.opened.lock().unwrap().len()
    }

    pub(crate) fn last(&self) -> Arc<FakeTransport> {
        self.opened
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no transport opened")
    }

    /// Most recent transport whose target starts with `prefix`.
    pub(crate) fn last_to(&self, prefix: &str) -> Arc<FakeTransport> {
        self.opened
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|transport| transport.target.starts_with(prefix))
            .cloned()
            .unwrap_or_else(|| panic!("no transport opened to {prefix}"))
    }
}

impl TransportFactory for FakeTransportFactory {
    fn open(&self, target: &str, events: EventSink) -> Arc<dyn Transport> {
        let transport = Arc::new(FakeTransport {
            target: target.to_string(),
            events,
            state: Mutex::new(ReadyState::Connecting),
            sent: Mutex::new(Vec::new()),
            close_calls: Mutex::new(Vec::new()),
        });
        self.opened.lock().unwrap().push(Arc::clone(&transport));
        transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn manual_scheduler_runs_due_tasks_in_order() {
        let scheduler = ManualScheduler::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for (label, ms) in [("b", 20u64), ("a", 10)] {
            let order = Arc::clone(&order);
            scheduler.schedule_once(
                Duration::from_millis(ms),
                Box::new(move |_| order.lock().unwrap().push(label)),
            );
        }
        scheduler.advance(Duration::from_millis(15));
        assert_eq!(*order.lock().unwrap(), vec!["a"]);
        scheduler.advance(Duration::from_millis(5));
        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn repeating_task_can_cancel_itself() {
        let scheduler = ManualScheduler::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&scheduler);
        let counter = Arc::clone(&ticks);
        scheduler.schedule_repeating(
            Duration::from_secs(1),
            Box::new(move |id| {
                if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                    handle.cancel(id);
                }
            }),
        );
        scheduler.advance(Duration::from_secs(10));
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
        assert_eq!(scheduler.pending(), 0);
    }
}
