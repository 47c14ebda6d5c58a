use crate::observers::{ThrottleEvent, ThrottleEventObserverTrait};
use async_trait::async_trait;
use tracing::debug;

pub struct DebugLogger {}

impl Default for DebugLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugLogger {
    pub fn new() -> Self {
        DebugLogger {}
    }
}

#[async_trait]
impl ThrottleEventObserverTrait for DebugLogger {
    async fn handle_event(&self, event: &ThrottleEvent) {
        debug!(
            event = ?event.event_type,
            client_id = %event.client_id,
            stat = ?event.stat,
            "throttle event"
        );
    }
}
