//! Exponential backoff between reconnect attempts.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::channel::ChannelKind;
use crate::events::ClientEvent;
use crate::scheduler::TimerId;

use super::Shared;

/// Delay before attempt number `attempt` (1-based): `base * 2^(attempt-1)`,
/// never above `max`.
pub(crate) fn backoff_delay(base: Duration, max: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(31);
    base.saturating_mul(1u32 << exponent).min(max)
}

enum Decision {
    Skip,
    Exhausted { attempts: u32 },
    Retry { attempt: u32, delay: Duration },
}

impl Shared {
    /// Schedule the next connect for `kind`, or give up once the attempt
    /// budget is spent.
    pub(crate) fn schedule_reconnect(
        self: &Arc<Self>,
        kind: ChannelKind,
        delay_override: Option<Duration>,
    ) {
        let decision = {
            let mut channels = self.lock_channels();
            let state = channels.get_mut(kind);
            if state.intentionally_closed {
                Decision::Skip
            } else if state.attempt >= self.settings.max_attempts {
                Decision::Exhausted {
                    attempts: state.attempt,
                }
            } else {
                state.attempt += 1;
                let attempt = state.attempt;
                let delay = delay_override.unwrap_or_else(|| {
                    backoff_delay(self.settings.base_interval, self.settings.max_interval, attempt)
                });
                let shared = Arc::downgrade(self);
                let timer = self.scheduler.schedule_once(
                    delay,
                    Box::new(move |id| {
                        if let Some(shared) = shared.upgrade() {
                            shared.on_reconnect_due(kind, id);
                        }
                    }),
                );
                if let Some(stale) = state.reconnect_timer.replace(timer) {
                    self.scheduler.cancel(stale);
                }
                Decision::Retry { attempt, delay }
            }
        };

        match decision {
            Decision::Skip => {
                debug!(channel = %kind, "Channel closed intentionally; not reconnecting");
            }
            Decision::Exhausted { attempts } => {
                warn!(channel = %kind, attempts, "Reconnect attempts exhausted; giving up");
                self.events
                    .publish(ClientEvent::ReconnectsExhausted { channel: kind, attempts });
            }
            Decision::Retry { attempt, delay } => {
                info!(
                    channel = %kind,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Reconnecting in {:?}", delay
                );
                self.events.publish(ClientEvent::ReconnectScheduled {
                    channel: kind,
                    attempt,
                    delay,
                });
            }
        }
    }

    fn on_reconnect_due(self: &Arc<Self>, kind: ChannelKind, timer: TimerId) {
        {
            let mut channels = self.lock_channels();
            let state = channels.get_mut(kind);
            if state.reconnect_timer != Some(timer) {
                debug!(channel = %kind, %timer, "Ignoring stale reconnect timer");
                return;
            }
            state.reconnect_timer = None;
            if state.intentionally_closed {
                return;
            }
        }
        self.connect_channel(kind);
    }
}
