use lazy_static::lazy_static;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::{self, Sender};
use tracing::{info, warn};

use super::{ThrottleEvent, ThrottleEventObserverTrait};

#[derive(Deserialize, Clone)]
pub struct EnvConfig {
    pub event_channel_size: Option<usize>,
}

lazy_static! {
    static ref CONFIG: EnvConfig = envy::from_env().unwrap_or(EnvConfig {
        event_channel_size: None
    });
    static ref THROTTLE_EVENT_OBSERVER: ThrottleEventObserver = ThrottleEventObserver::new();
}

/// Process-wide fan-out of throttle events.
///
/// Every registered observer gets its own broadcast receiver drained by a
/// dedicated task on the runtime it was registered from. Publishing never
/// blocks: a full channel makes slow observers lag and skip events.
pub struct ThrottleEventObserver {
    pub sender: Arc<Sender<Arc<ThrottleEvent>>>,
    pub has_observers: AtomicBool,
}

impl Default for ThrottleEventObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ThrottleEventObserver {
    pub fn new() -> Self {
        if let Some(size) = CONFIG.event_channel_size {
            info!(
                size,
                "EVENT_CHANNEL_SIZE is overriden. This can cause higher memory usage due to pre-allocation of channel memory."
            );
        }

        let (tx, _rx) = broadcast::channel(CONFIG.event_channel_size.unwrap_or(10000).max(1));
        ThrottleEventObserver {
            sender: Arc::new(tx),
            has_observers: AtomicBool::new(false),
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn add_observer(observer: Arc<dyn ThrottleEventObserverTrait + Send + Sync>) {
        let mut reader = THROTTLE_EVENT_OBSERVER.sender.subscribe();
        THROTTLE_EVENT_OBSERVER
            .has_observers
            .store(true, Ordering::SeqCst);
        tokio::spawn(async move {
            loop {
                match reader.recv().await {
                    Ok(event) => {
                        observer.handle_event(&event).await;
                    }
                    Err(RecvError::Closed) => {
                        warn!("throttle event writer dropped... removing reader...");
                        break;
                    }
                    Err(RecvError::Lagged(frames)) => {
                        warn!(
                            frames,
                            "throttle event reader lagging. Consider increasing EVENT_CHANNEL_SIZE."
                        );
                    }
                }
            }
        });
    }

    pub fn publish_event(event: ThrottleEvent) {
        if THROTTLE_EVENT_OBSERVER.has_observers.load(Ordering::SeqCst)
            && THROTTLE_EVENT_OBSERVER.sender.receiver_count() > 0
        {
            if let Err(e) = THROTTLE_EVENT_OBSERVER.sender.send(Arc::new(event)) {
                warn!("Dropping throttle event... no reader left... {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::{EventStat, OperationType, ThrottleEventType};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::time::Duration;

    struct RecordingObserver {
        events: Mutex<Vec<ThrottleEvent>>,
    }

    #[async_trait]
    impl ThrottleEventObserverTrait for RecordingObserver {
        async fn handle_event(&self, event: &ThrottleEvent) {
            self.events.lock().push(event.clone());
        }
    }

    #[tokio::test]
    async fn published_events_reach_registered_observer() {
        let observer = Arc::new(RecordingObserver {
            events: Mutex::new(vec![]),
        });
        ThrottleEventObserver::add_observer(observer.clone());

        let client_id: Arc<str> = Arc::from("observer-test-client");
        ThrottleEventObserver::publish_event(
            ThrottleEvent::new(ThrottleEventType::RefillPassCompleted, &client_id).with_stat(
                EventStat {
                    operation_type: OperationType::IncrByValue,
                    value: 3,
                },
            ),
        );

        let mut seen = None;
        for _ in 0..100 {
            seen = observer
                .events
                .lock()
                .iter()
                .find(|e| e.client_id == client_id)
                .cloned();
            if seen.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let event = seen.expect("event should be delivered");
        assert_eq!(event.event_type, ThrottleEventType::RefillPassCompleted);
        assert_eq!(event.stat.map(|s| s.value), Some(3));
    }
}
