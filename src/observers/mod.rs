pub mod throttle_event_observer;

use std::sync::Arc;

use async_trait::async_trait;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ThrottleEventType {
    PermitAcquired,
    PermitAcquiredAfterWait,
    RefillPassCompleted,
    RefillSchedulerStarted,
    RefillSchedulerStopped,
}

#[derive(Clone, PartialEq, Debug, Copy)]
pub enum OperationType {
    Distribution,
    IncrByValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventStat {
    pub operation_type: OperationType,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct ThrottleEvent {
    pub event_type: ThrottleEventType,
    pub client_id: Arc<str>,
    pub stat: Option<EventStat>,
}

impl ThrottleEvent {
    pub fn new(event_type: ThrottleEventType, client_id: &Arc<str>) -> ThrottleEvent {
        ThrottleEvent {
            event_type,
            client_id: Arc::clone(client_id),
            stat: None,
        }
    }

    pub fn with_stat(mut self, stat: EventStat) -> Self {
        self.stat = Some(stat);
        self
    }
}

#[async_trait]
pub trait ThrottleEventObserverTrait {
    async fn handle_event(&self, event: &ThrottleEvent);
}
