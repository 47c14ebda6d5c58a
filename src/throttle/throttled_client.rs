use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::refill_scheduler::RefillScheduler;
use super::token_bucket::TokenBucket;
use crate::config::ThrottleConfig;
use crate::error::ThrottleError;
use crate::observers::throttle_event_observer::ThrottleEventObserver;
use crate::observers::{EventStat, OperationType, ThrottleEvent, ThrottleEventType};
use crate::transport::HttpClientTrait;

// Waits shorter than this count as an immediately available permit.
const THROTTLED_WAIT_THRESHOLD: Duration = Duration::from_millis(1);

/// Wraps an HTTP client so that at most `capacity` requests go out back to
/// back, with the allowance restored every `period`.
///
/// Every call takes one permit and then forwards to the wrapped client
/// untouched: requests are not modified, responses are not inspected and
/// errors come back exactly as the wrapped client produced them. The only
/// observable difference from calling the wrapped client directly is the
/// time spent waiting for a permit.
///
/// Must be created inside a tokio runtime, which runs the refill task.
pub struct ThrottledClient<C> {
    inner: C,
    bucket: Arc<TokenBucket>,
    scheduler: RefillScheduler,
    client_id: Arc<str>,
}

impl ThrottledClient<reqwest::Client> {
    pub fn new(capacity: usize, period: Duration) -> Result<Self, ThrottleError> {
        Self::with_client(reqwest::Client::new(), capacity, period)
    }
}

impl<C> ThrottledClient<C>
where
    C: HttpClientTrait,
{
    pub fn with_client(inner: C, capacity: usize, period: Duration) -> Result<Self, ThrottleError> {
        Self::from_config(inner, &ThrottleConfig::new(capacity, period))
    }

    pub fn from_config(inner: C, config: &ThrottleConfig) -> Result<Self, ThrottleError> {
        config.validate()?;

        let client_id: Arc<str> = Arc::from(Uuid::new_v4().to_string());
        let bucket = Arc::new(TokenBucket::new(config.capacity)?);
        let scheduler =
            RefillScheduler::start(Arc::clone(&bucket), config.period, Arc::clone(&client_id))?;

        info!(
            client_id = %client_id,
            capacity = config.capacity,
            period_ms = config.period.as_millis() as u64,
            "throttled client started"
        );

        Ok(ThrottledClient {
            inner,
            bucket,
            scheduler,
            client_id,
        })
    }

    async fn admit(&self) {
        let start_time = Instant::now();
        self.bucket.acquire().await;
        let waited = start_time.elapsed();

        let event_type = if waited < THROTTLED_WAIT_THRESHOLD {
            ThrottleEventType::PermitAcquired
        } else {
            debug!(
                client_id = %self.client_id,
                waited_ms = waited.as_millis() as u64,
                "request was throttled"
            );
            ThrottleEventType::PermitAcquiredAfterWait
        };
        ThrottleEventObserver::publish_event(
            ThrottleEvent::new(event_type, &self.client_id).with_stat(EventStat {
                operation_type: OperationType::Distribution,
                value: waited.as_millis() as i64,
            }),
        );
    }
}

impl<C> ThrottledClient<C> {
    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn capacity(&self) -> usize {
        self.bucket.capacity()
    }

    pub fn period(&self) -> Duration {
        self.scheduler.period()
    }

    pub fn available_permits(&self) -> usize {
        self.bucket.available()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Stops refilling permits. Idempotent.
    ///
    /// Callers already waiting for a permit are not released and will wait
    /// forever unless they impose their own timeout. Calls made afterwards
    /// only succeed while permits remain in the bucket.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }
}

#[async_trait]
impl<C> HttpClientTrait for ThrottledClient<C>
where
    C: HttpClientTrait,
{
    type Request = C::Request;
    type Body = C::Body;
    type Response = C::Response;
    type Error = C::Error;

    async fn execute(&self, request: Self::Request) -> Result<Self::Response, Self::Error> {
        self.admit().await;
        self.inner.execute(request).await
    }

    async fn get(&self, url: &str) -> Result<Self::Response, Self::Error> {
        self.admit().await;
        self.inner.get(url).await
    }

    async fn head(&self, url: &str) -> Result<Self::Response, Self::Error> {
        self.admit().await;
        self.inner.head(url).await
    }

    async fn post(
        &self,
        url: &str,
        content_type: &str,
        body: Self::Body,
    ) -> Result<Self::Response, Self::Error> {
        self.admit().await;
        self.inner.post(url, content_type, body).await
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
    ) -> Result<Self::Response, Self::Error> {
        self.admit().await;
        self.inner.post_form(url, form).await
    }
}
