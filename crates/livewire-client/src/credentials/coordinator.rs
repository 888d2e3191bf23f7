//! Single-flight credential refresh.
//!
//! Any number of callers may ask for a fresh credential at once; only the
//! first triggers the upstream call, everyone else waits for its outcome.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::events::{ClientEvent, EventBus};

use super::types::{Credential, CredentialSource, RefreshError};

type RefreshWaiter = oneshot::Sender<Result<Credential, RefreshError>>;

struct RefreshState {
    credential: Credential,
    refreshing: bool,
    waiters: VecDeque<RefreshWaiter>,
}

struct Inner {
    source: Arc<dyn CredentialSource>,
    events: EventBus,
    state: Mutex<RefreshState>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the current credential and collapses concurrent refreshes into
/// one upstream call.
#[derive(Clone)]
pub struct CredentialRefreshCoordinator {
    inner: Arc<Inner>,
}

impl CredentialRefreshCoordinator {
    pub fn new(initial: Credential, source: Arc<dyn CredentialSource>, events: EventBus) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                events,
                state: Mutex::new(RefreshState {
                    credential: initial,
                    refreshing: false,
                    waiters: VecDeque::new(),
                }),
            }),
        }
    }

    pub fn current(&self) -> Credential {
        self.inner.lock().credential.clone()
    }

    /// Replace the stored credential without contacting upstream.
    pub fn replace(&self, credential: Credential) {
        self.inner.lock().credential = credential;
    }

    pub fn is_refreshing(&self) -> bool {
        self.inner.lock().refreshing
    }

    pub(crate) fn waiting(&self) -> usize {
        self.inner.lock().waiters.len()
    }

    /// Obtain a fresh credential.
    ///
    /// Joins the in-flight refresh if there is one. The upstream call runs
    /// on its own task, so dropping this future never strands other waiters.
    pub async fn refresh(&self) -> Result<Credential, RefreshError> {
        let (tx, rx) = oneshot::channel();
        let start = {
            let mut state = self.inner.lock();
            state.waiters.push_back(tx);
            !std::mem::replace(&mut state.refreshing, true)
        };

        if start {
            debug!("Starting credential refresh");
            tokio::spawn(run_refresh(Arc::clone(&self.inner)));
        } else {
            debug!("Joining in-flight credential refresh");
        }

        rx.await.unwrap_or(Err(RefreshError::Abandoned))
    }
}

async fn run_refresh(inner: Arc<Inner>) {
    let source = Arc::clone(&inner.source);
    let outcome = match tokio::spawn(async move { source.refresh().await }).await {
        Ok(outcome) => outcome,
        Err(e) => Err(RefreshError::Rejected(format!("credential source failed: {e}"))),
    };

    let waiters = {
        let mut state = inner.lock();
        if let Ok(credential) = &outcome {
            state.credential = credential.clone();
        }
        state.refreshing = false;
        std::mem::take(&mut state.waiters)
    };

    match &outcome {
        Ok(_) => {
            info!(waiters = waiters.len(), "Credential refreshed");
            inner.events.publish(ClientEvent::CredentialRefreshed);
        }
        Err(e) => {
            warn!(waiters = waiters.len(), error = %e, "Credential refresh failed");
            inner.events.publish(ClientEvent::CredentialRefreshFailed {
                error: e.to_string(),
            });
        }
    }

    for waiter in waiters {
        let _ = waiter.send(outcome.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::refresh_fn;
    use crate::testing::settle_until;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Source that counts calls and blocks until `gate` is notified.
    fn gated_source(
        calls: Arc<AtomicUsize>,
        gate: Arc<Notify>,
        outcome: Result<Credential, RefreshError>,
    ) -> Arc<dyn CredentialSource> {
        Arc::new(refresh_fn(move || {
            let calls = Arc::clone(&calls);
            let gate = Arc::clone(&gate);
            let outcome = outcome.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                gate.notified().await;
                outcome
            }
        }))
    }

    #[tokio::test]
    async fn concurrent_refreshes_share_one_upstream_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let coordinator = CredentialRefreshCoordinator::new(
            Credential::new("T1"),
            gated_source(Arc::clone(&calls), Arc::clone(&gate), Ok(Credential::new("T2"))),
            bus,
        );

        let first = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refresh().await }
        });
        let second = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refresh().await }
        });

        settle_until(|| calls.load(Ordering::SeqCst) == 1 && coordinator.waiting() == 2).await;
        assert!(coordinator.is_refreshing());
        gate.notify_one();

        let first = first.await.unwrap();
        let second = second.await.unwrap();
        assert_eq!(first, Ok(Credential::new("T2")));
        assert_eq!(second, first);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.current(), Credential::new("T2"));
        assert!(!coordinator.is_refreshing());
        assert_eq!(coordinator.waiting(), 0);
        assert_eq!(events.recv().await.unwrap(), ClientEvent::CredentialRefreshed);
    }

    #[tokio::test]
    async fn failure_reaches_every_waiter_and_keeps_old_credential() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let bus = EventBus::new(16);
        let mut events = bus.subscribe();
        let coordinator = CredentialRefreshCoordinator::new(
            Credential::new("T1"),
            gated_source(
                Arc::clone(&calls),
                Arc::clone(&gate),
                Err(RefreshError::Rejected("HTTP 401".into())),
            ),
            bus,
        );

        let first = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refresh().await }
        });
        let second = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refresh().await }
        });

        settle_until(|| coordinator.waiting() == 2).await;
        gate.notify_one();

        let expected = Err(RefreshError::Rejected("HTTP 401".into()));
        assert_eq!(first.await.unwrap(), expected);
        assert_eq!(second.await.unwrap(), expected);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(coordinator.current(), Credential::new("T1"));
        assert!(matches!(
            events.recv().await.unwrap(),
            ClientEvent::CredentialRefreshFailed { ref error } if error.contains("HTTP 401")
        ));
    }

    #[tokio::test]
    async fn settled_refresh_allows_a_new_upstream_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let source: Arc<dyn CredentialSource> = Arc::new(refresh_fn({
            let calls = Arc::clone(&calls);
            move || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Ok::<_, RefreshError>(Credential::new(format!("T{}", n + 1))) }
            }
        }));
        let coordinator =
            CredentialRefreshCoordinator::new(Credential::new("T1"), source, EventBus::new(16));

        assert_eq!(coordinator.refresh().await, Ok(Credential::new("T2")));
        assert_eq!(coordinator.refresh().await, Ok(Credential::new("T3")));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dropped_leader_does_not_strand_waiters() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(Notify::new());
        let coordinator = CredentialRefreshCoordinator::new(
            Credential::new("T1"),
            gated_source(Arc::clone(&calls), Arc::clone(&gate), Ok(Credential::new("T2"))),
            EventBus::new(16),
        );

        let leader = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refresh().await }
        });
        settle_until(|| calls.load(Ordering::SeqCst) == 1).await;
        leader.abort();

        let follower = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.refresh().await }
        });
        settle_until(|| coordinator.waiting() == 2).await;
        gate.notify_one();

        assert_eq!(follower.await.unwrap(), Ok(Credential::new("T2")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_source_rejects_waiters() {
        let source: Arc<dyn CredentialSource> = Arc::new(refresh_fn(|| async {
            let explode = true;
            if explode {
                panic!("refresh endpoint exploded");
            }
            Ok::<_, RefreshError>(Credential::new("never"))
        }));
        let coordinator =
            CredentialRefreshCoordinator::new(Credential::new("T1"), source, EventBus::new(16));

        let outcome = coordinator.refresh().await;
        assert!(matches!(outcome, Err(RefreshError::Rejected(_))));
        assert!(!coordinator.is_refreshing());
    }

    #[test]
    fn replace_updates_current() {
        let coordinator = CredentialRefreshCoordinator::new(
            Credential::new("T1"),
            Arc::new(crate::credentials::NoRefresh),
            EventBus::new(16),
        );
        coordinator.replace(Credential::new("T9"));
        assert_eq!(coordinator.current(), Credential::new("T9"));
    }
}
