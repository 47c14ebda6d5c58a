use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::token_bucket::{Permit, TokenBucket};
use crate::error::ThrottleError;
use crate::observers::throttle_event_observer::ThrottleEventObserver;
use crate::observers::{EventStat, OperationType, ThrottleEvent, ThrottleEventType};

/// Tops `bucket` back up to capacity and returns how many permits went in.
///
/// Stops at the first refused insert, which means the bucket was full at that
/// instant. At most `capacity` permits are added per pass even if acquirers
/// drain the bucket while the pass runs, so the number of admissions over k
/// periods stays within `capacity * (k + 1)`.
pub fn refill_pass(bucket: &TokenBucket) -> usize {
    let mut inserted = 0;
    while inserted < bucket.capacity() && bucket.try_insert(Permit::new()) {
        inserted += 1;
    }
    inserted
}

/// Background task that runs [`refill_pass`] once per period.
///
/// The task lives until [`RefillScheduler::shutdown`] is called or the
/// scheduler is dropped. Tasks still parked in `TokenBucket::acquire` at that
/// point are not woken; they stay pending until the bucket itself goes away.
pub struct RefillScheduler {
    period: Duration,
    shutdown_token: CancellationToken,
    join_handle: Mutex<Option<JoinHandle<()>>>,
}

impl RefillScheduler {
    /// Spawns the refill loop on the current tokio runtime. The first pass
    /// runs one full period after this call.
    pub fn start(
        bucket: Arc<TokenBucket>,
        period: Duration,
        client_id: Arc<str>,
    ) -> Result<Self, ThrottleError> {
        if period.is_zero() {
            return Err(ThrottleError::InvalidPeriod(period));
        }
        let handle = Handle::try_current().map_err(|_| ThrottleError::NoRuntime)?;

        let shutdown_token = CancellationToken::new();
        let join_handle = handle.spawn({
            let shutdown_token = shutdown_token.clone();
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            async move {
                ThrottleEventObserver::publish_event(ThrottleEvent::new(
                    ThrottleEventType::RefillSchedulerStarted,
                    &client_id,
                ));

                loop {
                    tokio::select! {
                        biased;
                        _ = shutdown_token.cancelled() => break,
                        _ = ticker.tick() => {}
                    }

                    let inserted = refill_pass(&bucket);
                    trace!(client_id = %client_id, inserted, "refill pass completed");
                    ThrottleEventObserver::publish_event(
                        ThrottleEvent::new(ThrottleEventType::RefillPassCompleted, &client_id)
                            .with_stat(EventStat {
                                operation_type: OperationType::IncrByValue,
                                value: inserted as i64,
                            }),
                    );
                }

                debug!(client_id = %client_id, "refill scheduler stopped");
                ThrottleEventObserver::publish_event(ThrottleEvent::new(
                    ThrottleEventType::RefillSchedulerStopped,
                    &client_id,
                ));
            }
        });

        Ok(RefillScheduler {
            period,
            shutdown_token,
            join_handle: Mutex::new(Some(join_handle)),
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stops refilling. Safe to call any number of times.
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown_token.is_cancelled()
            && self
                .join_handle
                .lock()
                .as_ref()
                .is_some_and(|handle| !handle.is_finished())
    }

    /// Shuts down and waits for the loop to exit.
    pub async fn stopped(&self) {
        self.shutdown();
        let join_handle = self.join_handle.lock().take();
        if let Some(join_handle) = join_handle {
            let _ = join_handle.await;
        }
    }
}

impl Drop for RefillScheduler {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
        if let Some(join_handle) = self.join_handle.lock().take() {
            join_handle.abort();
        }
    }
}
